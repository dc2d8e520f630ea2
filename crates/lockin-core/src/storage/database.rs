//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - The life ledger (`lives`, `lockout_date` in the key-value table)
//! - Completed sessions, for the daily summary

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data_dir;
use crate::error::StorageError;
use crate::lives::{LedgerRecord, LedgerStore, LIVES_KEY, LOCKOUT_DATE_KEY};
use crate::timer::SessionKind;

/// Completed sessions for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub day: Option<NaiveDate>,
    pub work_sessions: u64,
    pub work_minutes: u64,
    pub break_sessions: u64,
    pub break_minutes: u64,
}

/// SQLite database in the data directory.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/lockin.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("lockin.db"))
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                kind          TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                completed_on  TEXT NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_on ON sessions(completed_on);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Record a completed session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        kind: SessionKind,
        duration_secs: u32,
        completed_at: DateTime<Local>,
    ) -> Result<i64, StorageError> {
        let kind = match kind {
            SessionKind::Work => "work",
            SessionKind::Break => "break",
        };
        self.conn.execute(
            "INSERT INTO sessions (kind, duration_secs, completed_on, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                kind,
                duration_secs,
                completed_at.date_naive().format("%Y-%m-%d").to_string(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn day_summary(&self, day: NaiveDate) -> Result<SessionSummary, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE completed_on = ?1
             GROUP BY kind",
        )?;
        let rows = stmt.query_map(params![day.format("%Y-%m-%d").to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        let mut summary = SessionSummary {
            day: Some(day),
            ..SessionSummary::default()
        };
        for row in rows {
            let (kind, count, secs) = row?;
            match kind.as_str() {
                "work" => {
                    summary.work_sessions += count;
                    summary.work_minutes += secs / 60;
                }
                "break" => {
                    summary.break_sessions += count;
                    summary.break_minutes += secs / 60;
                }
                _ => {}
            }
        }
        Ok(summary)
    }
}

impl LedgerStore for Database {
    fn load(&self) -> Result<LedgerRecord, StorageError> {
        let lives = self
            .kv_get(LIVES_KEY)?
            .and_then(|v| v.trim().parse::<i64>().ok());
        let lockout_date = self.kv_get(LOCKOUT_DATE_KEY)?.unwrap_or_default();
        Ok(LedgerRecord {
            lives,
            lockout_date,
        })
    }

    /// Both keys are written in one transaction.
    fn save(&self, record: &LedgerRecord) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![LIVES_KEY, record.lives.unwrap_or_default().to_string()],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![LOCKOUT_DATE_KEY, record.lockout_date],
        )?;
        tx.commit()?;
        Ok(())
    }
}
