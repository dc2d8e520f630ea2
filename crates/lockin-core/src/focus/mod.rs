//! Focus signal adapters.
//!
//! The session controller never waits on a focus producer. Producers (the
//! HTTP poller, a camera pipeline, a test) write the latest reading into a
//! [`SharedFocus`]; the tick loop reads whatever is there.

mod http;

pub use http::{parse_focus_body, FocusPoller, HttpFocusClient, MIN_POLL_INTERVAL};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// One sample of the focus signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusReading {
    Focused,
    Unfocused,
    /// The producer could not answer. Counts as unfocused.
    Unavailable,
}

impl FocusReading {
    pub fn from_focused(focused: bool) -> Self {
        if focused {
            FocusReading::Focused
        } else {
            FocusReading::Unfocused
        }
    }

    pub fn is_focused(self) -> bool {
        self == FocusReading::Focused
    }

    fn to_u8(self) -> u8 {
        match self {
            FocusReading::Focused => 1,
            FocusReading::Unfocused => 2,
            FocusReading::Unavailable => 0,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => FocusReading::Focused,
            2 => FocusReading::Unfocused,
            _ => FocusReading::Unavailable,
        }
    }
}

/// Anything that can report the current focus state without blocking.
pub trait FocusSignal {
    fn read(&self) -> FocusReading;
}

/// Latest focus reading shared between a producer task and the tick loop.
///
/// Starts out `Unavailable` until a producer writes to it.
#[derive(Debug, Clone, Default)]
pub struct SharedFocus {
    value: Arc<AtomicU8>,
}

impl SharedFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, reading: FocusReading) {
        self.value.store(reading.to_u8(), Ordering::Release);
    }
}

impl FocusSignal for SharedFocus {
    fn read(&self) -> FocusReading {
        FocusReading::from_u8(self.value.load(Ordering::Acquire))
    }
}

/// A signal that never changes.
#[derive(Debug, Clone, Copy)]
pub struct StaticFocus(pub FocusReading);

impl FocusSignal for StaticFocus {
    fn read(&self) -> FocusReading {
        self.0
    }
}
