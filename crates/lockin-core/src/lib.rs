//! # lockin Core Library
//!
//! Core logic for lockin, a focus-gated Pomodoro timer. Work sessions only
//! count down while the user is focused; staying unfocused too long stops
//! the timer and puts one of five daily lives at risk. Running out of lives
//! locks the timer until the next calendar day.
//!
//! ## Architecture
//!
//! - **Timer**: the session clock, the unfocus guard, and the session
//!   controller that combines them with the life ledger. Driven by the
//!   caller's 1 Hz `tick()`; no internal threads
//! - **Lives**: the daily life budget, lockout, and its durable store
//! - **Focus**: non-blocking focus readings and an HTTP focus poller
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: single entry point for ticks and user intents
//! - [`LifeLedger`]: lives and lockout
//! - [`SharedFocus`]: latest focus reading written by a producer task
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod focus;
pub mod lives;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, FocusError, StorageError};
pub use events::{Event, Snapshot};
pub use focus::{FocusReading, FocusSignal, SharedFocus, StaticFocus};
pub use lives::{DayClock, LifeLedger, LocalDay, ManualDay, MemoryStore};
pub use storage::{Config, Database};
pub use timer::{
    AlertResolution, Phase, Prompt, RunState, SessionClock, SessionController, SessionKind,
};
