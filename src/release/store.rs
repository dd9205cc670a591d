//! SQLite-backed cache store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::release::cache::{CacheStore, current_timestamp_ms, expiry_timestamp_ms};
use crate::release::error::CacheError;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: expiry index for purge_expired
    &["CREATE INDEX IF NOT EXISTS idx_entries_expires_at ON entries(expires_at)"],
];

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Cache initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), CacheError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    /// Delete every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = current_timestamp_ms();
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM entries WHERE expires_at <= ?1", [now])?;
        debug!("Purged {} expired cache entries", removed);
        Ok(removed)
    }

    /// Keys of all stored entries, expired or not
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    pub fn clear(&self) -> Result<usize, CacheError> {
        let conn = self.lock_conn()?;
        Ok(conn.execute("DELETE FROM entries", [])?)
    }
}

impl CacheStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = current_timestamp_ms();
        let conn = self.lock_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1 AND expires_at > ?2",
                (key, now),
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let now = current_timestamp_ms();
        let expires_at = expiry_timestamp_ms(ttl);
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT INTO entries (key, value, stored_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                stored_at = excluded.stored_at,
                expires_at = excluded.expires_at
            "#,
            (key, value, now, expires_at),
        )?;

        debug!("Saved cache entry {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }
}
