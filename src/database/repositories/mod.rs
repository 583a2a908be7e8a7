pub mod media;

pub use media::MediaRepository;

use super::{DatabaseError, TableName};
use rusqlite::Connection;

pub trait Repository {
    fn connection(&self) -> &Connection;

    fn table(&self) -> &TableName;

    /// Number of rows in the repository's table.
    fn count(&self) -> Result<u64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table().quoted());
        let count: i64 = self.connection().query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
