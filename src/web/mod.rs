pub mod api;
pub mod api_doc;
mod server;
mod state;

pub use server::{router, run_server};
pub use state::AppState;
