//! Durable storage for the lives/lockout pair.
//!
//! Both values are written together on every mutation. The on-disk form is
//! two string keys: `lives` (an integer) and `lockout_date` (`YYYY-MM-DD`,
//! or empty when not locked out).

use chrono::{DateTime, Local, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

pub const LIVES_KEY: &str = "lives";
pub const LOCKOUT_DATE_KEY: &str = "lockout_date";

/// Persisted ledger values, before any invariant repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRecord {
    /// `None` when the key has never been written.
    pub lives: Option<i64>,
    /// Raw stored text; empty means not locked out.
    pub lockout_date: String,
}

impl LedgerRecord {
    pub fn new(lives: u8, lockout_date: Option<NaiveDate>) -> Self {
        Self {
            lives: Some(lives as i64),
            lockout_date: lockout_date.map(format_lockout_date).unwrap_or_default(),
        }
    }
}

pub trait LedgerStore {
    fn load(&self) -> Result<LedgerRecord, StorageError>;
    fn save(&self, record: &LedgerRecord) -> Result<(), StorageError>;
}

pub fn format_lockout_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a stored lockout date.
///
/// Accepts `YYYY-MM-DD`, and RFC 3339 timestamps written by older builds
/// (start of the local day), which are mapped back to the local date.
/// Returns `Ok(None)` for an empty value.
pub fn parse_lockout_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw).map(|ts| Some(ts.with_timezone(&Local).date_naive()))
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory key/value ledger store.
///
/// Clones share the same map. Reads and writes can be made to fail to
/// exercise the retry paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(lives: &str, lockout_date: &str) -> Self {
        let store = Self::default();
        {
            let mut inner = store.lock();
            inner.values.insert(LIVES_KEY.into(), lives.into());
            inner.values.insert(LOCKOUT_DATE_KEY.into(), lockout_date.into());
        }
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LedgerRecord, StorageError> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(StorageError::Locked);
        }
        Ok(LedgerRecord {
            lives: inner
                .values
                .get(LIVES_KEY)
                .and_then(|v| v.trim().parse::<i64>().ok()),
            lockout_date: inner
                .values
                .get(LOCKOUT_DATE_KEY)
                .cloned()
                .unwrap_or_default(),
        })
    }

    fn save(&self, record: &LedgerRecord) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::WriteRejected {
                key: LIVES_KEY.into(),
            });
        }
        let lives = record.lives.unwrap_or_default().to_string();
        inner.values.insert(LIVES_KEY.into(), lives);
        inner
            .values
            .insert(LOCKOUT_DATE_KEY.into(), record.lockout_date.clone());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_only_and_empty() {
        assert_eq!(parse_lockout_date(""), Ok(None));
        assert_eq!(parse_lockout_date("   "), Ok(None));
        assert_eq!(
            parse_lockout_date("2026-02-06"),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 6))
        );
        assert!(parse_lockout_date("yesterday").is_err());
    }

    #[test]
    fn parses_legacy_timestamp_as_local_day() {
        let midnight = NaiveDate::from_ymd_opt(2026, 2, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap();
        let raw = midnight.to_rfc3339();
        assert_eq!(
            parse_lockout_date(&raw),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 6))
        );
    }

    #[test]
    fn memory_store_roundtrip_and_failure() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), LedgerRecord::default());

        let date = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        store.save(&LedgerRecord::new(0, Some(date))).unwrap();
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("0"));
        assert_eq!(store.get(LOCKOUT_DATE_KEY).as_deref(), Some("2026-02-06"));

        store.set_fail_writes(true);
        assert!(store.save(&LedgerRecord::new(5, None)).is_err());
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("0"));
        assert_eq!(store.writes(), 1);
    }
}
