//! Embedded word store
//!
//! Each operation opens a short-lived connection; SQLite's own locking
//! serializes concurrent writers, so the store itself needs no lock and the
//! handle can be shared freely across request handlers.
//!
//! Every local write (insert or update) resets `synced_to_primary`, so the
//! record shows up in the next reconciliation pass.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::embedded::schema::{init_schema, needs_init};
use crate::models::{parse_timestamp, UpsertOutcome, WordRecord};

/// Health of the embedded store, reported as data rather than raised
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedStatus {
    pub status: StoreState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Active,
    Error,
}

impl EmbeddedStatus {
    pub fn is_active(&self) -> bool {
        self.status == StoreState::Active
    }
}

/// SQLite-backed word store
pub struct EmbeddedStore {
    data_dir: PathBuf,
    db_path: PathBuf,
}

impl EmbeddedStore {
    /// Open the store, provisioning the directory and schema
    ///
    /// Safe to call on every process start.
    pub fn open(config: &Config) -> Result<Self> {
        config.ensure_data_dir()?;

        let store = Self {
            data_dir: config.data_dir.clone(),
            db_path: config.sqlite_path(),
        };

        let conn = store.connection()?;
        if needs_init(&conn) {
            init_schema(&conn).context("Failed to initialize embedded store schema")?;
            debug!("embedded store schema initialized at {:?}", store.db_path);
        }

        Ok(store)
    }

    /// Open a connection for a single operation
    fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open embedded store at {:?}", self.db_path))?;
        // Wait out a concurrent writer instead of failing with SQLITE_BUSY
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Insert or update a record by word
    ///
    /// Inserts set `created_at = updated_at = now`; updates refresh
    /// `meaning`, `type`, `context` and `updated_at`. Both paths leave the
    /// record unsynced.
    pub fn upsert(
        &self,
        word: &str,
        meaning: &str,
        word_type: &str,
        context: &str,
    ) -> Result<(WordRecord, UpsertOutcome)> {
        let conn = self.connection()?;
        let now = Utc::now().to_rfc3339();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM words WHERE word = ?1",
                params![word],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = if existing.is_some() {
            conn.execute(
                "UPDATE words
                 SET meaning = ?1, type = ?2, context = ?3, updated_at = ?4, synced_to_primary = 0
                 WHERE word = ?5",
                params![meaning, word_type, context, now, word],
            )?;
            UpsertOutcome::Updated
        } else {
            conn.execute(
                "INSERT INTO words (word, meaning, type, context, created_at, updated_at, synced_to_primary)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![word, meaning, word_type, context, now, now],
            )?;
            UpsertOutcome::Created
        };

        let record = conn.query_row(
            "SELECT id, word, meaning, type, context, created_at, updated_at, synced_to_primary
             FROM words WHERE word = ?1",
            params![word],
            record_from_row,
        )?;

        Ok((record, outcome))
    }

    /// All records, newest first
    pub fn list_all(&self) -> Result<Vec<WordRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, word, meaning, type, context, created_at, updated_at, synced_to_primary
             FROM words ORDER BY created_at DESC",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Every stored word key
    pub fn known_words(&self) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT word FROM words")?;

        let words = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(words)
    }

    /// Records not yet mirrored to the primary store
    pub fn list_unsynced(&self) -> Result<Vec<WordRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, word, meaning, type, context, created_at, updated_at, synced_to_primary
             FROM words WHERE synced_to_primary = 0",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Flag a record as mirrored; no-op when the word is absent
    pub fn mark_synced(&self, word: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE words SET synced_to_primary = 1 WHERE word = ?1",
            params![word],
        )?;
        Ok(changed > 0)
    }

    /// Verify the store is usable
    ///
    /// Checks that the directory exists and is writable and that a trivial
    /// query succeeds. Never propagates a failure; every problem comes back
    /// as an `error` status with detail.
    pub fn check_status(&self) -> EmbeddedStatus {
        let location = self.db_path.display().to_string();

        if !self.data_dir.exists() {
            return EmbeddedStatus {
                status: StoreState::Error,
                error: Some(format!(
                    "data directory {:?} does not exist",
                    self.data_dir
                )),
                location,
            };
        }

        match std::fs::metadata(&self.data_dir) {
            Ok(meta) if meta.permissions().readonly() => {
                return EmbeddedStatus {
                    status: StoreState::Error,
                    error: Some(format!("data directory {:?} is not writable", self.data_dir)),
                    location,
                };
            }
            Err(e) => {
                return EmbeddedStatus {
                    status: StoreState::Error,
                    error: Some(format!("cannot inspect data directory: {}", e)),
                    location,
                };
            }
            Ok(_) => {}
        }

        let probe = self
            .connection()
            .and_then(|conn| {
                conn.query_row("SELECT count(*) FROM words", [], |row| row.get::<_, i64>(0))
                    .context("probe query failed")
            });

        match probe {
            Ok(_) => EmbeddedStatus {
                status: StoreState::Active,
                error: None,
                location,
            },
            Err(e) => EmbeddedStatus {
                status: StoreState::Error,
                error: Some(format!("{:#}", e)),
                location,
            },
        }
    }
}

/// Map a `words` row to a record
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<WordRecord> {
    let id: i64 = row.get(0)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    let synced: i64 = row.get(7)?;

    Ok(WordRecord {
        id: Some(id.to_string()),
        word: row.get(1)?,
        meaning: row.get(2)?,
        word_type: row.get(3)?,
        context: row.get(4)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
        synced_to_primary: synced != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> EmbeddedStore {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        EmbeddedStore::open(&config).unwrap()
    }

    #[test]
    fn test_open_provisions_directory_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().join("nested").join("data"),
            ..Config::default()
        };

        let store = EmbeddedStore::open(&config).unwrap();
        assert!(config.sqlite_path().exists());
        assert!(store.check_status().is_active());
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let (record, outcome) = store.upsert("ephemeral", "short-lived", "adjective", "").unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(record.word, "ephemeral");
        assert!(!record.synced_to_primary);
        assert!(record.id.is_some());

        let (record, outcome) = store.upsert("ephemeral", "fleeting", "adjective", "").unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(record.meaning, "fleeting");

        // Still exactly one record
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_update_preserves_created_at() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let (first, _) = store.upsert("stone", "rock", "noun", "").unwrap();
        let (second, _) = store.upsert("stone", "pebble", "noun", "").unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_local_edit_resets_sync_flag() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.upsert("river", "flowing water", "noun", "").unwrap();
        assert!(store.mark_synced("river").unwrap());
        assert!(store.list_unsynced().unwrap().is_empty());

        // A later local write un-syncs the record
        let (record, _) = store.upsert("river", "a stream", "noun", "").unwrap();
        assert!(!record.synced_to_primary);
        assert_eq!(store.list_unsynced().unwrap().len(), 1);
    }

    #[test]
    fn test_list_all_is_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.upsert("first", "", "", "").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.upsert("second", "", "", "").unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].word, "second");
        assert_eq!(all[1].word, "first");
    }

    #[test]
    fn test_known_words() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.upsert("alpha", "", "", "").unwrap();
        store.upsert("beta", "", "", "").unwrap();

        let mut words = store.known_words().unwrap();
        words.sort();
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_mark_synced_missing_word_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.mark_synced("ghost").unwrap());
    }

    #[test]
    fn test_check_status_reports_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(store.check_status().is_active());

        drop(temp_dir); // removes the data directory

        let status = store.check_status();
        assert_eq!(status.status, StoreState::Error);
        assert!(status.error.unwrap().contains("does not exist"));
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        {
            let store = EmbeddedStore::open(&config).unwrap();
            store.upsert("durable", "lasting", "adjective", "").unwrap();
        }

        let store = EmbeddedStore::open(&config).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].meaning, "lasting");
    }
}
