pub mod config;
pub mod feed;
pub mod formation;
pub mod predict;
pub mod tracker;
pub mod web;

pub use config::{Config, ConfigError};
