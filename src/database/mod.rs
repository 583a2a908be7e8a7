pub mod connection;
pub mod models;
pub mod repositories;

pub use connection::{with_store, MediaStore};
pub use models::MediaRecord;
pub use repositories::{MediaRepository, Repository};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Table used when the configuration does not name one.
pub const DEFAULT_TABLE: &str = "media";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Invalid table name: {0:?}")]
    InvalidTable(String),

    #[error("Could not create data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An SQL identifier that is safe to splice into query text.
///
/// Values are always bound as parameters, but SQLite cannot bind identifiers,
/// so table names are restricted to `[A-Za-z_][A-Za-z0-9_]*` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self, DatabaseError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(DatabaseError::InvalidTable(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use inside SQL text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
