//! Session clock: the Work/Break countdown.
//!
//! The clock is a plain second-granularity counter. It never reads wall
//! time; the caller ticks it once per second and says whether this tick is
//! allowed to count down. Completion is reported, not acted on: choosing the
//! next session and rewarding the user belongs to the controller.

use serde::{Deserialize, Serialize};

/// Shortest allowed session of either kind, in minutes.
pub const MIN_MINUTES: u32 = 1;
/// Longest allowed Work session, in minutes.
pub const MAX_WORK_MINUTES: u32 = 120;
/// Longest allowed Break session, in minutes.
pub const MAX_BREAK_MINUTES: u32 = 60;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn other(self) -> Self {
        match self {
            SessionKind::Work => SessionKind::Break,
            SessionKind::Break => SessionKind::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::Break => "Break",
        }
    }

    fn max_minutes(self) -> u32 {
        match self {
            SessionKind::Work => MAX_WORK_MINUTES,
            SessionKind::Break => MAX_BREAK_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Stopped,
    Running,
}

/// Clamp a minute count into the bounds for `kind`.
pub fn clamp_minutes(kind: SessionKind, minutes: i64) -> u32 {
    minutes.clamp(MIN_MINUTES as i64, kind.max_minutes() as i64) as u32
}

/// Drop every non-digit character from a text edit.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Parse a raw duration edit into clamped minutes.
///
/// Non-digits are dropped. An empty result falls back to the minimum, and a
/// digit run too long for `i64` saturates before clamping.
pub fn parse_minutes(kind: SessionKind, text: &str) -> u32 {
    let value = text
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d as i64));
    clamp_minutes(kind, value)
}

/// Countdown for the current session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    kind: SessionKind,
    work_duration_secs: u32,
    break_duration_secs: u32,
    remaining_secs: u32,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES as i64, DEFAULT_BREAK_MINUTES as i64)
    }
}

impl SessionClock {
    /// Create a clock on a fresh Work session. Both durations are clamped.
    pub fn new(work_minutes: i64, break_minutes: i64) -> Self {
        let work_duration_secs = clamp_minutes(SessionKind::Work, work_minutes) * 60;
        Self {
            kind: SessionKind::Work,
            work_duration_secs,
            break_duration_secs: clamp_minutes(SessionKind::Break, break_minutes) * 60,
            remaining_secs: work_duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn work_duration_secs(&self) -> u32 {
        self.work_duration_secs
    }

    pub fn break_duration_secs(&self) -> u32 {
        self.break_duration_secs
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_duration_secs / 60
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_duration_secs / 60
    }

    pub fn duration_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Work => self.work_duration_secs,
            SessionKind::Break => self.break_duration_secs,
        }
    }

    pub fn total_secs(&self) -> u32 {
        self.duration_for(self.kind)
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs().max(1) as f64;
        1.0 - (self.remaining_secs as f64 / total)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns true if the stored duration changed.
    pub fn set_work_minutes(&mut self, minutes: i64, run_state: RunState) -> bool {
        self.set_minutes(SessionKind::Work, minutes, run_state)
    }

    /// Returns true if the stored duration changed.
    pub fn set_break_minutes(&mut self, minutes: i64, run_state: RunState) -> bool {
        self.set_minutes(SessionKind::Break, minutes, run_state)
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.total_secs();
    }

    /// Advance one second. Returns true when the session is complete, i.e.
    /// `remaining_secs` is zero after this tick.
    pub fn tick(&mut self, can_count_down: bool) -> bool {
        if can_count_down && self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
        self.remaining_secs == 0
    }

    pub fn switch_kind(&mut self) {
        self.kind = self.kind.other();
        self.reset();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_minutes(&mut self, kind: SessionKind, minutes: i64, run_state: RunState) -> bool {
        let secs = clamp_minutes(kind, minutes) * 60;
        let slot = match kind {
            SessionKind::Work => &mut self.work_duration_secs,
            SessionKind::Break => &mut self.break_duration_secs,
        };
        if *slot == secs {
            return false;
        }
        *slot = secs;
        if run_state == RunState::Stopped && kind == self.kind {
            self.reset();
        }
        true
    }
}
