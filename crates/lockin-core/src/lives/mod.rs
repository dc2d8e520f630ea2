mod day;
mod ledger;
mod store;

pub use day::{DayClock, LocalDay, ManualDay};
pub use ledger::{LifeChange, LifeLedger, MAX_LIVES};
pub use store::{
    format_lockout_date, parse_lockout_date, LedgerRecord, LedgerStore, MemoryStore, LIVES_KEY,
    LOCKOUT_DATE_KEY,
};
