pub mod commands;
pub mod config;
pub mod core;
pub mod database;
pub mod error;
pub mod logging;

pub use commands::{classify_path, classify_path_with, index_path, list_records, lookup};
pub use config::Config;
pub use error::{Error, Result};
