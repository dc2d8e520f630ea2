use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Prompt, RunState, SessionKind};

/// Every state change in the session controller produces an Event.
/// Shells render from [`Snapshot`]s and use events for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        kind: SessionKind,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// A pause was requested and awaits confirmation.
    PauseRequested {
        at: DateTime<Utc>,
    },
    PauseCancelled {
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        kind: SessionKind,
        at: DateTime<Utc>,
    },
    DurationChanged {
        kind: SessionKind,
        minutes: u32,
        at: DateTime<Utc>,
    },
    /// Sustained unfocus during Work stopped the timer.
    FocusEscalated {
        unfocused_secs: u32,
        at: DateTime<Utc>,
    },
    /// The user chose to restart the session and refocus.
    Refocused {
        at: DateTime<Utc>,
    },
    /// The user gave up on the session after an escalation.
    GaveUp {
        at: DateTime<Utc>,
    },
    SessionCompleted {
        kind: SessionKind,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// The next session started automatically after a completion.
    SessionSwitched {
        kind: SessionKind,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    LifeLost {
        remaining: u8,
        at: DateTime<Utc>,
    },
    LifeGained {
        lives: u8,
        at: DateTime<Utc>,
    },
    LockedOut {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    LockoutLifted {
        lives: u8,
        at: DateTime<Utc>,
    },
}

/// Everything a shell needs to draw the current state. Building one has no
/// side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub kind: SessionKind,
    pub run_state: RunState,
    pub remaining_secs: u32,
    pub total_secs: u32,
    /// 0.0 .. 1.0 progress within the current session.
    pub progress: f64,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub is_focused: bool,
    pub unfocused_secs: u32,
    pub pending_prompt: Option<Prompt>,
    pub is_locked_out: bool,
    pub lives: u8,
    pub lockout_date: Option<NaiveDate>,
}

impl Snapshot {
    pub fn pending_alert(&self) -> bool {
        self.pending_prompt == Some(Prompt::Unfocused)
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn remaining_label(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }
}

pub fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(1500), "25:00");
        assert_eq!(format_mm_ss(7199), "119:59");
        assert_eq!(format_mm_ss(61), "01:01");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let at = Utc::now();
        let json = serde_json::to_value(Event::LifeLost { remaining: 2, at }).unwrap();
        assert_eq!(json["type"], "life_lost");
        assert_eq!(json["remaining"], 2);
    }
}
