use crate::core::hash::{ContentHash, HashService};
use crate::core::scanner::ScanError;
use crate::core::FailurePolicy;
use crate::database::MediaRecord;
use crate::error::Error;
use log::{debug, info};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Class label to the files that currently carry it.
///
/// Serializes as a plain `{ label: [path, ...] }` map. Paths that are not
/// valid UTF-8 are written lossily.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationIndex(BTreeMap<String, Vec<PathBuf>>);

impl Serialize for ClassificationIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, paths) in &self.0 {
            let paths: Vec<_> = paths.iter().map(|p| p.to_string_lossy()).collect();
            map.serialize_entry(label, &paths)?;
        }
        map.end()
    }
}

impl ClassificationIndex {
    pub fn get(&self, label: &str) -> Option<&[PathBuf]> {
        self.0.get(label).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of resolved paths across all labels.
    pub fn resolved(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves stored hashes back to the paths they live at right now.
///
/// Every current file is hashed once into a `hash -> path` table, then each
/// record is a single lookup. When several files share content, the first
/// one in traversal order wins.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    hash_service: HashService,
    policy: FailurePolicy,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hash_index<I>(&self, paths: I) -> Result<HashMap<ContentHash, PathBuf>, Error>
    where
        I: IntoIterator<Item = Result<PathBuf, ScanError>>,
    {
        let mut index = HashMap::new();

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e @ ScanError::InvalidRoot { .. }) => return Err(e.into()),
                Err(e) => {
                    self.policy.absorb(e)?;
                    continue;
                }
            };

            match self.hash_service.compute_content_hash(&path) {
                Ok(hash) => {
                    index.entry(hash).or_insert(path);
                }
                Err(e) => self.policy.absorb(e)?,
            }
        }

        Ok(index)
    }

    /// Build the label index for `records` against a fresh traversal.
    ///
    /// Every stored label shows up as a key. Records whose content is no
    /// longer on disk are dropped without error.
    pub fn reconcile<I>(&self, records: &[MediaRecord], paths: I) -> Result<ClassificationIndex, Error>
    where
        I: IntoIterator<Item = Result<PathBuf, ScanError>>,
    {
        let current = self.hash_index(paths)?;
        let mut classes: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        let mut missing = 0usize;

        for record in records {
            let resolved = classes.entry(record.label.clone()).or_default();
            match current.get(&record.hash) {
                Some(path) => resolved.push(path.clone()),
                None => {
                    debug!("No current file for {} ({})", record.hash, record.label);
                    missing += 1;
                }
            }
        }

        for paths in classes.values_mut() {
            paths.sort();
        }

        let index = ClassificationIndex(classes);
        info!(
            "Reconciled {} record(s): {} resolved, {} missing",
            records.len(),
            index.resolved(),
            missing
        );
        Ok(index)
    }
}
