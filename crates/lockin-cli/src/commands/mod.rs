pub mod config;
pub mod focus;
pub mod run;
pub mod stats;
pub mod status;

use lockin_core::focus::HttpFocusClient;
use lockin_core::lives::LedgerStore;
use lockin_core::storage::{FocusConfig, FocusSourceKind};
use lockin_core::{
    Config, Database, DayClock, FocusError, FocusReading, LifeLedger, LocalDay, MemoryStore,
    SessionClock, SessionController, StaticFocus,
};

/// Where focus readings come from, as configured.
pub enum FocusSource {
    Static(StaticFocus),
    Http(HttpFocusClient),
}

pub fn focus_source(cfg: &FocusConfig) -> Result<FocusSource, FocusError> {
    Ok(match cfg.source {
        FocusSourceKind::Always => FocusSource::Static(StaticFocus(FocusReading::Focused)),
        FocusSourceKind::Never => FocusSource::Static(StaticFocus(FocusReading::Unfocused)),
        FocusSourceKind::Http => {
            FocusSource::Http(HttpFocusClient::new(&cfg.endpoint, cfg.timeout())?)
        }
    })
}

/// Build a controller from the configured schedule and the stored ledger.
/// `ephemeral` keeps lives in memory only.
pub fn build_controller(
    config: &Config,
    ephemeral: bool,
) -> lockin_core::error::Result<SessionController> {
    let store: Box<dyn LedgerStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(Database::open()?)
    };
    let ledger = LifeLedger::load(store, LocalDay.today());
    let clock = SessionClock::new(
        config.schedule.work_minutes as i64,
        config.schedule.break_minutes as i64,
    );
    Ok(SessionController::new(clock, ledger, Box::new(LocalDay)))
}
