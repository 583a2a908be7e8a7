use crate::config::ConfigError;
use crate::core::hash::HashError;
use crate::core::scanner::ScanError;
use crate::database::DatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hash computation error: {0}")]
    Hash(#[from] HashError),

    #[error("Store error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
