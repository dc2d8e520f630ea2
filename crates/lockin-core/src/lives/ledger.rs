//! Life ledger: the daily life budget and lockout.
//!
//! Invariant: `lives == 0` exactly when a lockout date is recorded. The
//! last life and the lockout date are set in the same call and persisted in
//! the same write, so a crash can never leave a spent life behind.
//!
//! Every mutation is written through immediately. A failed write is logged
//! and remembered; the in-memory value stays authoritative and the write is
//! retried on the next mutation (or an explicit [`LifeLedger::flush`]).
//!
//! If the store cannot be read at load time the ledger locks out for the
//! day and writes nothing until a later [`LifeLedger::flush`] reads the
//! stored record successfully.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::{parse_lockout_date, LedgerRecord, LedgerStore, MemoryStore};

/// Fixed daily life budget.
pub const MAX_LIVES: u8 = 5;

/// Outcome of a ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifeChange {
    /// Already at the floor or ceiling.
    Unchanged,
    Lost { remaining: u8 },
    Gained { lives: u8 },
    /// The last life was spent and the ledger is locked for `date`.
    LockedOut { date: NaiveDate },
}

pub struct LifeLedger {
    lives: u8,
    lockout_date: Option<NaiveDate>,
    store: Box<dyn LedgerStore>,
    /// Set while the store holds an older value than memory.
    unsaved: bool,
    /// Set while the stored record has never been read. Writes are held
    /// back so a read failure cannot overwrite real data.
    detached: bool,
}

impl std::fmt::Debug for LifeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifeLedger")
            .field("lives", &self.lives)
            .field("lockout_date", &self.lockout_date)
            .field("unsaved", &self.unsaved)
            .field("detached", &self.detached)
            .finish()
    }
}

impl LifeLedger {
    /// Load the ledger from `store`, repairing anything that breaks the
    /// lives/lockout invariant.
    ///
    /// Repair always fails closed: a recorded lockout wins over a nonzero
    /// life count, and zero lives without a date (or an unreadable date)
    /// locks out for `today`. Unreadable storage also locks out for
    /// `today`, without writing, until a flush can read it.
    pub fn load(store: Box<dyn LedgerStore>, today: NaiveDate) -> Self {
        let mut ledger = Self {
            lives: 0,
            lockout_date: Some(today),
            store,
            unsaved: false,
            detached: true,
        };
        ledger.attach(today);
        ledger
    }

    /// Read the stored record and adopt it. Stays detached on failure.
    fn attach(&mut self, today: NaiveDate) {
        let record = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to read life ledger, locked out until it can be read");
                return;
            }
        };

        let mut lives = record
            .lives
            .map(|n| n.clamp(0, MAX_LIVES as i64) as u8)
            .unwrap_or(MAX_LIVES);
        let mut repaired = record.lives.is_some_and(|n| n != lives as i64);

        let lockout_date = match parse_lockout_date(&record.lockout_date) {
            Ok(Some(date)) => {
                if lives != 0 {
                    lives = 0;
                    repaired = true;
                }
                Some(date)
            }
            Ok(None) if lives == 0 => {
                repaired = true;
                Some(today)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(raw = %record.lockout_date, error = %e, "unreadable lockout date, locking out for today");
                lives = 0;
                repaired = true;
                Some(today)
            }
        };

        self.lives = lives;
        self.lockout_date = lockout_date;
        self.detached = false;
        self.unsaved = false;
        if repaired {
            self.persist();
        }
    }

    /// A ledger backed by a fresh in-memory store.
    pub fn in_memory(today: NaiveDate) -> Self {
        Self::load(Box::new(MemoryStore::new()), today)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn lockout_date(&self) -> Option<NaiveDate> {
        self.lockout_date
    }

    pub fn is_locked_out(&self) -> bool {
        self.lockout_date.is_some()
    }

    /// True while a failed write is waiting to be retried, or while the
    /// stored record has not been read yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved || self.detached
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Spend a life. Spending the last one records `today` as the lockout
    /// day. No-op once at zero.
    pub fn lose_life(&mut self, today: NaiveDate, reason: &str) -> LifeChange {
        if self.lives == 0 {
            return LifeChange::Unchanged;
        }
        self.lives -= 1;
        let change = if self.lives == 0 {
            self.lockout_date = Some(today);
            info!(reason, %today, "lost last life, locked out for the day");
            LifeChange::LockedOut { date: today }
        } else {
            info!(reason, remaining = self.lives, "lost a life");
            LifeChange::Lost {
                remaining: self.lives,
            }
        };
        self.persist();
        change
    }

    /// Earn a life back, up to the ceiling. Never lifts a lockout.
    pub fn gain_life(&mut self) -> LifeChange {
        if self.lives >= MAX_LIVES || self.is_locked_out() {
            return LifeChange::Unchanged;
        }
        self.lives += 1;
        info!(lives = self.lives, "gained a life");
        self.persist();
        LifeChange::Gained { lives: self.lives }
    }

    /// Lift the lockout once `today` is strictly after the lockout day.
    /// Returns true if the budget was restored.
    pub fn check_rollover(&mut self, today: NaiveDate) -> bool {
        match self.lockout_date {
            Some(date) if today > date => {
                self.lives = MAX_LIVES;
                self.lockout_date = None;
                info!(%date, %today, "new day, lives restored");
                self.persist();
                true
            }
            _ => false,
        }
    }

    /// Retry a previously failed read or write. Returns true if storage is
    /// current.
    pub fn flush(&mut self, today: NaiveDate) -> bool {
        if self.detached {
            self.attach(today);
        } else if self.unsaved {
            self.persist();
        }
        !self.has_unsaved_changes()
    }

    fn persist(&mut self) {
        if self.detached {
            self.unsaved = true;
            return;
        }
        let record = LedgerRecord::new(self.lives, self.lockout_date);
        match self.store.save(&record) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                warn!(error = %e, lives = self.lives, "failed to persist life ledger, will retry");
                self.unsaved = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lives::store::{LIVES_KEY, LOCKOUT_DATE_KEY};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn ledger_with(store: &MemoryStore, today: NaiveDate) -> LifeLedger {
        LifeLedger::load(Box::new(store.clone()), today)
    }

    #[test]
    fn fresh_store_starts_full_and_unlocked() {
        let ledger = LifeLedger::in_memory(day(6));
        assert_eq!(ledger.lives(), MAX_LIVES);
        assert!(!ledger.is_locked_out());
    }

    #[test]
    fn gain_caps_at_five() {
        let mut ledger = LifeLedger::in_memory(day(6));
        assert_eq!(ledger.gain_life(), LifeChange::Unchanged);
        ledger.lose_life(day(6), "test");
        assert_eq!(ledger.gain_life(), LifeChange::Gained { lives: 5 });
    }

    #[test]
    fn losing_last_life_locks_out_atomically() {
        let store = MemoryStore::with_values("1", "");
        let mut ledger = ledger_with(&store, day(6));
        let writes_before = store.writes();

        assert_eq!(
            ledger.lose_life(day(6), "test"),
            LifeChange::LockedOut { date: day(6) }
        );
        assert_eq!(ledger.lives(), 0);
        assert_eq!(ledger.lockout_date(), Some(day(6)));
        assert_eq!(store.writes(), writes_before + 1);
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("0"));
        assert_eq!(store.get(LOCKOUT_DATE_KEY).as_deref(), Some("2026-02-06"));

        assert_eq!(ledger.lose_life(day(6), "test"), LifeChange::Unchanged);
        assert_eq!(ledger.gain_life(), LifeChange::Unchanged);
    }

    #[test]
    fn rollover_requires_strictly_later_day() {
        let store = MemoryStore::with_values("0", "2026-02-06");
        let mut ledger = ledger_with(&store, day(6));
        assert!(ledger.is_locked_out());
        assert!(!ledger.check_rollover(day(6)));
        assert!(!ledger.check_rollover(day(5)));
        assert!(ledger.check_rollover(day(7)));
        assert_eq!(ledger.lives(), MAX_LIVES);
        assert!(!ledger.is_locked_out());
        assert_eq!(store.get(LOCKOUT_DATE_KEY).as_deref(), Some(""));
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("5"));
    }

    #[test]
    fn load_repairs_broken_invariants() {
        let store = MemoryStore::with_values("0", "");
        let ledger = ledger_with(&store, day(6));
        assert_eq!(ledger.lockout_date(), Some(day(6)));
        assert_eq!(store.get(LOCKOUT_DATE_KEY).as_deref(), Some("2026-02-06"));

        let store = MemoryStore::with_values("3", "2026-02-05");
        let ledger = ledger_with(&store, day(6));
        assert_eq!(ledger.lives(), 0);
        assert!(ledger.is_locked_out());

        let store = MemoryStore::with_values("9", "");
        let ledger = ledger_with(&store, day(6));
        assert_eq!(ledger.lives(), MAX_LIVES);
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("5"));

        let store = MemoryStore::with_values("4", "garbage");
        let ledger = ledger_with(&store, day(6));
        assert_eq!(ledger.lives(), 0);
        assert_eq!(ledger.lockout_date(), Some(day(6)));
    }

    #[test]
    fn failed_write_is_retried_on_next_mutation() {
        let store = MemoryStore::new();
        let mut ledger = ledger_with(&store, day(6));

        store.set_fail_writes(true);
        ledger.lose_life(day(6), "test");
        assert_eq!(ledger.lives(), 4);
        assert!(ledger.has_unsaved_changes());
        assert!(!ledger.flush(day(6)));

        store.set_fail_writes(false);
        ledger.lose_life(day(6), "test");
        assert!(!ledger.has_unsaved_changes());
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn flush_retries_without_mutation() {
        let store = MemoryStore::new();
        let mut ledger = ledger_with(&store, day(6));
        store.set_fail_writes(true);
        ledger.lose_life(day(6), "test");
        store.set_fail_writes(false);
        assert!(ledger.flush(day(6)));
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("4"));
    }

    #[test]
    fn unreadable_store_locks_out_without_overwriting() {
        let store = MemoryStore::with_values("2", "");
        store.set_fail_reads(true);
        let mut ledger = ledger_with(&store, day(6));
        assert!(ledger.is_locked_out());
        assert!(ledger.has_unsaved_changes());

        // A new day would normally restore the budget and write it.
        assert!(ledger.check_rollover(day(7)));
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("2"));
        assert_eq!(store.writes(), 0);
        assert!(!ledger.flush(day(7)));

        store.set_fail_reads(false);
        assert!(ledger.flush(day(7)));
        assert_eq!(ledger.lives(), 2);
        assert!(!ledger.is_locked_out());

        ledger.lose_life(day(7), "test");
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("1"));
    }

    #[test]
    fn stored_lockout_survives_a_failed_read() {
        let store = MemoryStore::with_values("0", "2026-02-06");
        store.set_fail_reads(true);
        let mut ledger = ledger_with(&store, day(6));
        assert_eq!(ledger.lose_life(day(6), "test"), LifeChange::Unchanged);
        assert_eq!(ledger.gain_life(), LifeChange::Unchanged);
        assert_eq!(store.get(LOCKOUT_DATE_KEY).as_deref(), Some("2026-02-06"));

        store.set_fail_reads(false);
        assert!(ledger.flush(day(6)));
        assert_eq!(ledger.lockout_date(), Some(day(6)));
        assert_eq!(store.get(LIVES_KEY).as_deref(), Some("0"));
    }
}
