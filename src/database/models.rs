use crate::core::hash::ContentHash;
use serde::{Deserialize, Serialize};

/// One row of the media table: a content hash and the label it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRecord {
    pub hash: ContentHash,
    pub label: String,
}

impl MediaRecord {
    pub fn new(hash: ContentHash, label: impl Into<String>) -> Self {
        Self {
            hash,
            label: label.into(),
        }
    }
}
