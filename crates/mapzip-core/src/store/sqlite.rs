//! SQLite-backed key-value store.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::KeyValueStore;
use crate::error::{MapzipError, Result, StoreResultExt};

const SELECT_VALUE_SQL: &str = "SELECT value FROM kv WHERE key = ?1";
const UPSERT_VALUE_SQL: &str = "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
const DELETE_VALUE_SQL: &str = "DELETE FROM kv WHERE key = ?1";

/// Device-local store persisted in a single SQLite file.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the store at `path` and initializes the
    /// schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MapzipError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let connection = Connection::open(path).store_context("Failed to open store")?;
        Self::from_connection(connection)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().store_context("Failed to open in-memory store")?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(include_str!("../../assets/schema.sql"))
            .store_context("Failed to initialize store schema")?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Returns the default store path following the XDG Base Directory
    /// specification: `$XDG_DATA_HOME/mapzip/mapzip.db`.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("mapzip")
            .place_data_file("mapzip.db")
            .map_err(|e| MapzipError::XdgDirectory(e.to_string()))
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection()
            .query_row(SELECT_VALUE_SQL, params![key], |row| row.get(0))
            .optional()
            .store_context("Failed to read key")
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.connection()
            .execute(
                UPSERT_VALUE_SQL,
                params![key, value, Timestamp::now().to_string()],
            )
            .store_context("Failed to write key")?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.connection()
            .execute(DELETE_VALUE_SQL, params![key])
            .store_context("Failed to delete key")?;
        Ok(())
    }
}
