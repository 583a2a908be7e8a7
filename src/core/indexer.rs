use crate::core::classifier::Classifier;
use crate::core::hash::HashService;
use crate::core::scanner::ScanError;
use crate::core::FailurePolicy;
use crate::database::MediaRepository;
use crate::error::Error;
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Counters for one indexing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Image files handed to the indexer.
    pub files_seen: usize,
    /// Files whose hash was new and got classified and stored.
    pub indexed: usize,
    /// Files whose hash was already in the store.
    pub already_known: usize,
    /// Walk or hash failures absorbed by [`FailurePolicy::Skip`].
    pub skipped: usize,
}

impl fmt::Display for IndexReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) seen, {} indexed, {} already known, {} skipped",
            self.files_seen, self.indexed, self.already_known, self.skipped
        )
    }
}

/// Hashes each scanned file and stores a label for every hash not seen before.
pub struct Indexer<'r, C> {
    repo: &'r MediaRepository<'r>,
    classifier: C,
    hash_service: HashService,
    policy: FailurePolicy,
}

impl<'r, C: Classifier> Indexer<'r, C> {
    pub fn new(repo: &'r MediaRepository<'r>, classifier: C) -> Self {
        Self {
            repo,
            classifier,
            hash_service: HashService::new(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one pass over `paths`.
    ///
    /// Known hashes are neither re-classified nor rewritten. Each upsert
    /// commits on its own, so an aborted pass keeps what it stored so far.
    pub fn index<I>(&self, paths: I) -> Result<IndexReport, Error>
    where
        I: IntoIterator<Item = Result<PathBuf, ScanError>>,
    {
        let mut report = IndexReport::default();

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e @ ScanError::InvalidRoot { .. }) => return Err(e.into()),
                Err(e) => {
                    self.policy.absorb(e)?;
                    report.skipped += 1;
                    continue;
                }
            };
            report.files_seen += 1;

            let hash = match self.hash_service.compute_content_hash(&path) {
                Ok(hash) => hash,
                Err(e) => {
                    self.policy.absorb(e)?;
                    report.skipped += 1;
                    continue;
                }
            };

            if self.repo.exists(&hash)? {
                debug!("Already indexed {} ({})", path.display(), hash);
                report.already_known += 1;
                continue;
            }

            let label = self.classifier.classify(&path);
            self.repo.upsert(&hash, &label)?;
            debug!("Indexed {} as {:?} ({})", path.display(), label, hash);
            report.indexed += 1;
        }

        info!("Indexing pass complete: {}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::StubClassifier;
    use crate::core::scanner::Scanner;
    use crate::database::{MediaRecord, MediaStore, Repository, TableName};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn sorted_records(repo: &MediaRepository<'_>) -> Vec<MediaRecord> {
        let mut records = repo.all_records().unwrap();
        records.sort_by(|a, b| a.hash.cmp(&b.hash));
        records
    }

    #[test]
    fn test_single_image_gets_one_record() {
        let temp_dir = TempDir::new().unwrap();
        let image = temp_dir.path().join("a.png");
        fs::write(&image, b"png bytes").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"text").unwrap();

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();
        let scanner = Scanner::new(temp_dir.path());

        let report = Indexer::new(&repo, StubClassifier::new())
            .index(scanner.scan())
            .unwrap();

        assert_eq!(report.files_seen, 1);
        assert_eq!(report.indexed, 1);

        let expected = HashService::new().compute_content_hash(&image).unwrap();
        assert_eq!(
            repo.all_records().unwrap(),
            vec![MediaRecord::new(expected, "thing")]
        );
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), b"one").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), b"two").unwrap();

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();
        let scanner = Scanner::new(temp_dir.path());

        let first = Indexer::new(&repo, StubClassifier::new())
            .index(scanner.scan())
            .unwrap();
        let before = sorted_records(&repo);

        // A different label on the second pass must not churn stored rows.
        let second = Indexer::new(&repo, StubClassifier::with_label("other"))
            .index(scanner.scan())
            .unwrap();

        assert_eq!(first.indexed, 2);
        assert_eq!(second.indexed, 0);
        assert_eq!(second.already_known, 2);
        assert_eq!(sorted_records(&repo), before);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_content_stored_once() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), b"same").unwrap();
        fs::write(temp_dir.path().join("copy.png"), b"same").unwrap();

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();

        let report = Indexer::new(&repo, StubClassifier::new())
            .index(Scanner::new(temp_dir.path()).scan())
            .unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.already_known, 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_skip_policy_continues_past_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.png");
        fs::write(&good, b"good").unwrap();
        let missing = temp_dir.path().join("missing.png");

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();

        let report = Indexer::new(&repo, StubClassifier::new())
            .with_policy(FailurePolicy::Skip)
            .index(vec![Ok(missing), Ok(good)])
            .unwrap();

        assert_eq!(report.files_seen, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.indexed, 1);
    }

    #[test]
    fn test_abort_policy_stops_on_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.png");
        fs::write(&good, b"good").unwrap();
        let missing = temp_dir.path().join("missing.png");

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();

        let result = Indexer::new(&repo, StubClassifier::new())
            .with_policy(FailurePolicy::Abort)
            .index(vec![Ok(missing), Ok(good)]);

        assert!(matches!(result, Err(Error::Hash(_))));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_follows_policy() {
        use crate::core::testing::LockedDir;

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.png"), b"visible").unwrap();
        let Some(_locked) = LockedDir::create(&temp_dir.path().join("private")) else {
            return;
        };
        let scanner = Scanner::new(temp_dir.path());

        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();

        let report = Indexer::new(&repo, StubClassifier::new())
            .with_policy(FailurePolicy::Skip)
            .index(scanner.scan())
            .unwrap();
        assert_eq!(report.files_seen, 1);
        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, 1);

        let other = MediaStore::open_in_memory().unwrap();
        let other_repo = other.media(&TableName::default()).unwrap();
        let result = Indexer::new(&other_repo, StubClassifier::new())
            .with_policy(FailurePolicy::Abort)
            .index(scanner.scan());
        assert!(matches!(result, Err(Error::Scan(ScanError::Walk(_)))));
        // Files visited before the failure stay stored.
        assert_eq!(other_repo.count().unwrap(), 1);
    }

    #[test]
    fn test_invalid_root_always_aborts() {
        let store = MediaStore::open_in_memory().unwrap();
        let repo = store.media(&TableName::default()).unwrap();
        let scanner = Scanner::new(Path::new("/definitely/not/a/real/dir"));

        let result = Indexer::new(&repo, StubClassifier::new())
            .with_policy(FailurePolicy::Skip)
            .index(scanner.scan());

        assert!(matches!(
            result,
            Err(Error::Scan(ScanError::InvalidRoot { .. }))
        ));
    }
}
