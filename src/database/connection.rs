use super::{DatabaseError, MediaRepository, TableName};
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Exclusive handle on the media database.
///
/// Every statement runs in autocommit mode, so each upsert is durable as soon
/// as it returns. Dropping the store closes the connection.
pub struct MediaStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl MediaStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.configure_pragmas()?;
        debug!("Opened media store at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.configure_pragmas()?;
        Ok(store)
    }

    fn configure_pragmas(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Repository for `table`, creating the table if it does not exist yet.
    pub fn media(&self, table: &TableName) -> Result<MediaRepository<'_>, DatabaseError> {
        let repo = MediaRepository::new(&self.conn, table.clone());
        repo.create_table()?;
        Ok(repo)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.conn.close().map_err(|(_, e)| DatabaseError::Query(e))
    }
}

/// Open the store at `path`, run `f`, and close the store on every exit path.
///
/// A failure inside `f` wins over a failure to close.
pub fn with_store<T, E, F>(path: &Path, f: F) -> Result<T, E>
where
    F: FnOnce(&MediaStore) -> Result<T, E>,
    E: From<DatabaseError>,
{
    let store = MediaStore::open(path)?;
    match f(&store) {
        Ok(value) => {
            store.close()?;
            Ok(value)
        }
        Err(e) => {
            drop(store);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::ContentHash;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("nested").join("test.db");

        let store = MediaStore::open(&db_path).unwrap();
        assert_eq!(store.path(), Some(db_path.as_path()));
        store.close().unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn test_with_store_persists_across_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let table = TableName::default();
        let hash = ContentHash::new("abc");

        with_store(&db_path, |store| {
            store.media(&table)?.upsert(&hash, "thing")
        })
        .unwrap();

        let exists = with_store(&db_path, |store| store.media(&table)?.exists(&hash)).unwrap();
        assert!(exists);
    }

    #[test]
    fn test_with_store_returns_closure_error() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let result: Result<(), DatabaseError> = with_store(&db_path, |store| {
            store.connection().execute_batch("SELECT * FROM missing_table")?;
            Ok(())
        });

        assert!(matches!(result, Err(DatabaseError::Query(_))));
        // The failed session must not leave the file locked.
        assert!(MediaStore::open(&db_path).unwrap().close().is_ok());
    }
}
