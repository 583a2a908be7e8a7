use crate::config::Config;
use crate::core::classifier::{Classifier, StubClassifier};
use crate::core::indexer::{IndexReport, Indexer};
use crate::core::reconciler::{ClassificationIndex, Reconciler};
use crate::database::{with_store, MediaRecord};
use crate::error::Result;
use log::info;

/// Index every image under `config.root`, then map each stored class back to
/// the files that currently hold it.
pub fn classify_path(config: &Config) -> Result<ClassificationIndex> {
    classify_path_with(config, StubClassifier::new())
}

/// [`classify_path`] with a caller-supplied classifier.
pub fn classify_path_with<C: Classifier>(
    config: &Config,
    classifier: C,
) -> Result<ClassificationIndex> {
    config.validate()?;
    let table = config.table_name()?;
    let scanner = config.scanner();
    info!("Classifying images under {}", scanner.root().display());

    with_store(&config.database_path(), |store| {
        let repo = store.media(&table)?;

        Indexer::new(&repo, classifier)
            .with_policy(config.failure_policy)
            .index(scanner.scan())?;

        // The first traversal is spent; walk again for the current layout.
        let records = repo.all_records()?;
        Reconciler::new()
            .with_policy(config.failure_policy)
            .reconcile(&records, scanner.scan())
    })
}

/// Run only the indexing pass.
pub fn index_path(config: &Config) -> Result<IndexReport> {
    config.validate()?;
    let table = config.table_name()?;
    let scanner = config.scanner();

    with_store(&config.database_path(), |store| {
        let repo = store.media(&table)?;
        Indexer::new(&repo, StubClassifier::new())
            .with_policy(config.failure_policy)
            .index(scanner.scan())
    })
}

/// Resolve what is already stored without indexing anything new.
pub fn lookup(config: &Config) -> Result<ClassificationIndex> {
    config.validate()?;
    let table = config.table_name()?;
    let scanner = config.scanner();

    with_store(&config.database_path(), |store| {
        let records = store.media(&table)?.all_records()?;
        Reconciler::new()
            .with_policy(config.failure_policy)
            .reconcile(&records, scanner.scan())
    })
}

pub fn list_records(config: &Config) -> Result<Vec<MediaRecord>> {
    let table = config.table_name()?;

    with_store(&config.database_path(), |store| {
        Ok(store.media(&table)?.all_records()?)
    })
}
