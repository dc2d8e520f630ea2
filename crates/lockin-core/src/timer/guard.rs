//! Focus guard: unfocus escalation during Work sessions.
//!
//! The focus signal is sampled once per tick. Unfocus must persist across
//! consecutive ticks to count, so a single stale detector miss never raises
//! an alert. Once the counter reaches the threshold the guard raises exactly
//! one escalation and then stays quiet until [`FocusGuard::resolve`].
//!
//! ## Escalation
//!
//! ```text
//! focused ─(miss)─> counting 1..threshold ─(threshold)─> pending alert
//!    ^                    │                                   │
//!    └────(focus back)────┘                    resolve() ─────┘
//! ```

use serde::{Deserialize, Serialize};

use super::clock::{RunState, SessionKind};

/// Seconds of sustained unfocus before the guard escalates.
pub const DEFAULT_ALERT_THRESHOLD_SECS: u32 = 30;

/// Raised once per unfocus episode when the threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub unfocused_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusGuard {
    is_focused: bool,
    unfocused_secs: u32,
    alert_threshold_secs: u32,
    pending_alert: bool,
}

impl Default for FocusGuard {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_ALERT_THRESHOLD_SECS)
    }
}

impl FocusGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A threshold of zero is raised to one tick.
    pub fn with_threshold(alert_threshold_secs: u32) -> Self {
        Self {
            is_focused: false,
            unfocused_secs: 0,
            alert_threshold_secs: alert_threshold_secs.max(1),
            pending_alert: false,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn unfocused_secs(&self) -> u32 {
        self.unfocused_secs
    }

    pub fn alert_threshold_secs(&self) -> u32 {
        self.alert_threshold_secs
    }

    pub fn pending_alert(&self) -> bool {
        self.pending_alert
    }

    /// Record one tick's focus sample.
    pub fn observe(
        &mut self,
        focused: bool,
        kind: SessionKind,
        run_state: RunState,
    ) -> Option<Escalation> {
        self.is_focused = focused;

        if kind != SessionKind::Work || run_state != RunState::Running || focused {
            self.unfocused_secs = 0;
            return None;
        }

        self.unfocused_secs = self.unfocused_secs.saturating_add(1);
        if self.unfocused_secs >= self.alert_threshold_secs && !self.pending_alert {
            self.pending_alert = true;
            return Some(Escalation {
                unfocused_secs: self.unfocused_secs,
            });
        }
        None
    }

    /// The user answered the escalation.
    pub fn resolve(&mut self) {
        self.pending_alert = false;
        self.unfocused_secs = 0;
    }

    /// Drop the current unfocus episode without touching a pending alert.
    pub fn clear(&mut self) {
        self.unfocused_secs = 0;
    }
}
