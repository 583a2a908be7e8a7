use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Hex-encoded SHA-256 digest of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wraps an already computed digest, e.g. one read back from the store.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes content hashes for image files
#[derive(Debug, Clone, Copy)]
pub struct HashService;

impl HashService {
    pub fn new() -> Self {
        Self
    }

    /// Compute SHA-256 content hash of the file at `file_path`.
    /// Only the bytes matter: name, location and mtime never affect the result.
    pub fn compute_content_hash(&self, file_path: &Path) -> Result<ContentHash, HashError> {
        let io_err = |source| HashError::Io {
            path: file_path.to_path_buf(),
            source,
        };

        let file = File::open(file_path).map_err(io_err)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(io_err)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(ContentHash(format!("{:x}", hasher.finalize())))
    }
}

impl Default for HashService {
    fn default() -> Self {
        Self::new()
    }
}
