pub mod error;
pub mod missions;
pub mod passes;
