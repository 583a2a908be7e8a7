use super::{DatabaseError, Repository};
use crate::core::hash::ContentHash;
use crate::database::models::MediaRecord;
use crate::database::TableName;
use rusqlite::{params, Connection};

/// CRUD over the `hash -> imageClass` table.
pub struct MediaRepository<'c> {
    conn: &'c Connection,
    table: TableName,
}

impl Repository for MediaRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }

    fn table(&self) -> &TableName {
        &self.table
    }
}

impl<'c> MediaRepository<'c> {
    pub fn new(conn: &'c Connection, table: TableName) -> Self {
        Self { conn, table }
    }

    pub fn create_table(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (hash TEXT PRIMARY KEY, imageClass TEXT)",
                self.table.quoted()
            ),
            [],
        )?;
        Ok(())
    }

    pub fn exists(&self, hash: &ContentHash) -> Result<bool, DatabaseError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE hash = ?1)",
            self.table.quoted()
        ))?;
        let found: bool = stmt.query_row(params![hash.as_str()], |row| row.get(0))?;
        Ok(found)
    }

    /// Insert `(hash, label)`, replacing the label if the hash is already stored.
    pub fn upsert(&self, hash: &ContentHash, label: &str) -> Result<(), DatabaseError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT OR REPLACE INTO {} (hash, imageClass) VALUES (?1, ?2)",
            self.table.quoted()
        ))?;
        stmt.execute(params![hash.as_str(), label])?;
        Ok(())
    }

    /// Every stored record. Row order is not guaranteed.
    pub fn all_records(&self) -> Result<Vec<MediaRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT imageClass, hash FROM {}", self.table.quoted()))?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (label, hash) = row?;
            records.push(MediaRecord::new(
                ContentHash::new(hash),
                label.unwrap_or_default(),
            ));
        }

        Ok(records)
    }
}
