//! Key-value blob storage for persisted state.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::chat::core::config::StorageConfig;
use crate::chat::core::errors::ChatResult;

/// Named-slot blob store.
///
/// Everything runs on the UI thread, so the trait is synchronous.
pub trait BlobStore {
    /// Read a slot. `Ok(None)` when the slot was never written.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn remove(&mut self, slot: &str) -> ChatResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>> {
        (**self).get(slot)
    }

    fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()> {
        (**self).put(slot, blob)
    }

    fn remove(&mut self, slot: &str) -> ChatResult<()> {
        (**self).remove(slot)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for &mut T {
    fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>> {
        (**self).get(slot)
    }

    fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()> {
        (**self).put(slot, blob)
    }

    fn remove(&mut self, slot: &str) -> ChatResult<()> {
        (**self).remove(slot)
    }
}

/// Process-local blob store.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    slots: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>> {
        Ok(self.slots.get(slot).cloned())
    }

    fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()> {
        self.slots.insert(slot.to_string(), blob.to_vec());
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> ChatResult<()> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// `SQLite` implementation of the blob store.
pub struct SqliteBlobStore {
    conn: Connection,
    table: String,
}

impl SqliteBlobStore {
    /// Table name used when none is configured.
    pub const DEFAULT_TABLE: &'static str = "moa_blobs";

    /// Open the database named in the storage config and create the table.
    ///
    /// The table name must already have been validated as an identifier.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(config: &StorageConfig) -> ChatResult<Self> {
        if let Some(parent) = config
            .sqlite_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(&config.sqlite_path)?, &config.table)
    }

    /// Private in-memory database, gone when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn open_in_memory() -> ChatResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, Self::DEFAULT_TABLE)
    }

    fn with_connection(conn: Connection, table: &str) -> ChatResult<Self> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                slot TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            )"
        ))?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, slot: &str) -> ChatResult<Option<Vec<u8>>> {
        let table = &self.table;
        let blob = self
            .conn
            .query_row(
                &format!("SELECT value FROM {table} WHERE slot = ?1"),
                rusqlite::params![slot],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn put(&mut self, slot: &str, blob: &[u8]) -> ChatResult<()> {
        let table = &self.table;
        let now_ms = Utc::now().timestamp_millis();
        self.conn.execute(
            &format!(
                "INSERT INTO {table} (slot, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(slot) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
            ),
            rusqlite::params![slot, blob, now_ms],
        )?;
        debug!("Wrote {} bytes to slot {slot}", blob.len());
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> ChatResult<()> {
        let table = &self.table;
        self.conn.execute(
            &format!("DELETE FROM {table} WHERE slot = ?1"),
            rusqlite::params![slot],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn BlobStore) {
        assert_eq!(store.get("a").unwrap(), None);

        store.put("a", b"first").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"first".to_vec()));

        store.put("a", b"second").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"second".to_vec()));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_blob_store() {
        let mut store = MemoryBlobStore::new();
        exercise(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sqlite_blob_store() {
        let mut store = SqliteBlobStore::open_in_memory().unwrap();
        exercise(&mut store);
    }

    #[test]
    fn test_boxed_blob_store() {
        let mut store: Box<dyn BlobStore> = Box::new(MemoryBlobStore::new());
        exercise(&mut store);
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            sqlite_path: dir.path().join("nested").join("moa.sqlite"),
            ..StorageConfig::default()
        };

        {
            let mut store = SqliteBlobStore::open(&config).unwrap();
            store.put("chatbot-storage", b"{}").unwrap();
        }

        let store = SqliteBlobStore::open(&config).unwrap();
        assert_eq!(store.get("chatbot-storage").unwrap(), Some(b"{}".to_vec()));
    }
}
