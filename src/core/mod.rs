pub mod classifier;
pub mod hash;
pub mod indexer;
pub mod reconciler;
pub mod scanner;

#[cfg(all(test, unix))]
mod testing;

use crate::error::Error;
use log::warn;
use serde::{Deserialize, Serialize};

/// What to do when a single file cannot be walked or hashed.
///
/// Store errors are never covered by the policy; they always abort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure, count it, and carry on with the next file.
    #[default]
    Skip,
    /// Stop the whole pass with the first failure.
    Abort,
}

impl FailurePolicy {
    /// `Ok(())` means the caller should skip the file and continue.
    pub(crate) fn absorb(self, err: impl Into<Error>) -> Result<(), Error> {
        let err = err.into();
        match self {
            FailurePolicy::Abort => Err(err),
            FailurePolicy::Skip => {
                warn!("Skipping file: {}", err);
                Ok(())
            }
        }
    }
}
