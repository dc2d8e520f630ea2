//! Session controller: the single entry point for ticks and user intents.
//!
//! The controller owns the clock, the focus guard and the life ledger and is
//! the only place their effects are combined. It is driven by the caller:
//! `tick()` once per second with the latest focus reading, plus the intent
//! methods when the user acts. Nothing here blocks or spawns.
//!
//! ## Phases
//!
//! ```text
//!            start                escalation
//!   Idle ───────────> Active ─────────────────> Alerting
//!    ^  <───────────  │  ^                        │   │
//!    │ reset/pause ok │  └──── refocus ───────────┘   │
//!    └────────────────┴───────── give up ─────────────┘
//!
//!   any life loss reaching zero ──> Locked ──(next day)──> Idle
//! ```
//!
//! ## Tick order
//!
//! 1. day rollover check
//! 2. stop if locked out
//! 3. focus guard observes the reading; an escalation ends the tick
//! 4. if active, the clock ticks (Break always counts, Work only when focused)
//! 5. a completed session rewards Work and starts the next session

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::clock::{parse_minutes, RunState, SessionClock, SessionKind};
use super::guard::FocusGuard;
use crate::events::{Event, Snapshot};
use crate::focus::FocusReading;
use crate::lives::{DayClock, LifeChange, LifeLedger};

/// Derived controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Out of lives until the next calendar day.
    Locked,
    Idle,
    Active,
    /// Stopped by an unfocus escalation, waiting for a resolution.
    Alerting,
}

/// A question the shell must put to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// Unfocused too long: refocus or give up.
    Unfocused,
    /// Pausing costs a life: confirm or cancel.
    PauseConfirmation,
}

/// Answers to [`Prompt::Unfocused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertResolution {
    /// Restart the session and keep going.
    Refocus,
    /// Stop and pay a life.
    GiveUp,
}

/// Result of one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub events: Vec<Event>,
    pub snapshot: Snapshot,
}

pub struct SessionController {
    clock: SessionClock,
    guard: FocusGuard,
    ledger: LifeLedger,
    run_state: RunState,
    pause_requested: bool,
    day: Box<dyn DayClock>,
}

impl SessionController {
    /// Create a stopped controller and run the startup rollover check.
    pub fn new(clock: SessionClock, ledger: LifeLedger, day: Box<dyn DayClock>) -> Self {
        let mut controller = Self {
            clock,
            guard: FocusGuard::default(),
            ledger,
            run_state: RunState::Stopped,
            pause_requested: false,
            day,
        };
        controller.check_day_rollover();
        controller
    }

    pub fn with_guard(mut self, guard: FocusGuard) -> Self {
        self.guard = guard;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        if self.ledger.is_locked_out() {
            Phase::Locked
        } else if self.guard.pending_alert() {
            Phase::Alerting
        } else if self.run_state == RunState::Running {
            Phase::Active
        } else {
            Phase::Idle
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn guard(&self) -> &FocusGuard {
        &self.guard
    }

    pub fn ledger(&self) -> &LifeLedger {
        &self.ledger
    }

    pub fn pending_prompt(&self) -> Option<Prompt> {
        match self.phase() {
            Phase::Alerting => Some(Prompt::Unfocused),
            Phase::Active if self.pause_requested => Some(Prompt::PauseConfirmation),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase(),
            kind: self.clock.kind(),
            run_state: self.run_state,
            remaining_secs: self.clock.remaining_secs(),
            total_secs: self.clock.total_secs(),
            progress: self.clock.progress(),
            work_minutes: self.clock.work_minutes(),
            break_minutes: self.clock.break_minutes(),
            is_focused: self.guard.is_focused(),
            unfocused_secs: self.guard.unfocused_secs(),
            pending_prompt: self.pending_prompt(),
            is_locked_out: self.ledger.is_locked_out(),
            lives: self.ledger.lives(),
            lockout_date: self.ledger.lockout_date(),
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    pub fn tick(&mut self, reading: FocusReading) -> TickReport {
        // Retried even while locked so a failed lockout write still lands.
        self.ledger.flush(self.day.today());

        let mut events = Vec::new();
        events.extend(self.check_day_rollover());

        if self.ledger.is_locked_out() {
            return self.report(events);
        }

        let focused = reading.is_focused();
        if let Some(escalation) = self
            .guard
            .observe(focused, self.clock.kind(), self.run_state)
        {
            self.run_state = RunState::Stopped;
            self.pause_requested = false;
            warn!(
                unfocused_secs = escalation.unfocused_secs,
                "unfocused too long, timer stopped"
            );
            events.push(Event::FocusEscalated {
                unfocused_secs: escalation.unfocused_secs,
                at: Utc::now(),
            });
            return self.report(events);
        }

        if self.phase() == Phase::Active {
            let can_count_down = self.clock.kind() == SessionKind::Break || focused;
            if self.clock.tick(can_count_down) {
                self.complete_session(&mut events);
            }
        }

        self.report(events)
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.phase() != Phase::Idle {
            return None;
        }
        self.run_state = RunState::Running;
        self.pause_requested = false;
        info!(kind = ?self.clock.kind(), remaining = self.clock.remaining_secs(), "session started");
        Some(Event::SessionStarted {
            kind: self.clock.kind(),
            remaining_secs: self.clock.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Ask to pause. Pausing costs a life, so it only takes effect through
    /// [`SessionController::resolve_pause`].
    pub fn request_pause(&mut self) -> Option<Event> {
        if self.phase() != Phase::Active || self.pause_requested {
            return None;
        }
        self.pause_requested = true;
        Some(Event::PauseRequested { at: Utc::now() })
    }

    pub fn resolve_pause(&mut self, confirmed: bool) -> Vec<Event> {
        if self.pending_prompt() != Some(Prompt::PauseConfirmation) {
            return Vec::new();
        }
        self.pause_requested = false;
        if !confirmed {
            return vec![Event::PauseCancelled { at: Utc::now() }];
        }

        self.run_state = RunState::Stopped;
        self.guard.clear();
        info!(remaining = self.clock.remaining_secs(), "paused");
        let mut events = vec![Event::Paused {
            remaining_secs: self.clock.remaining_secs(),
            at: Utc::now(),
        }];
        self.lose_life("paused timer", &mut events);
        events
    }

    pub fn reset(&mut self) -> Option<Event> {
        if !matches!(self.phase(), Phase::Idle | Phase::Active) {
            return None;
        }
        self.clock.reset();
        self.run_state = RunState::Stopped;
        self.pause_requested = false;
        self.guard.clear();
        info!(kind = ?self.clock.kind(), "session reset");
        Some(Event::SessionReset {
            kind: self.clock.kind(),
            at: Utc::now(),
        })
    }

    pub fn resolve_alert(&mut self, resolution: AlertResolution) -> Vec<Event> {
        if self.phase() != Phase::Alerting {
            return Vec::new();
        }
        let mut events = Vec::new();
        match resolution {
            AlertResolution::Refocus => {
                self.clock.reset();
                self.guard.resolve();
                self.run_state = RunState::Running;
                info!("restarted session after losing focus");
                events.push(Event::Refocused { at: Utc::now() });
            }
            AlertResolution::GiveUp => {
                events.push(Event::GaveUp { at: Utc::now() });
                self.lose_life("lost focus and gave up", &mut events);
                self.clock.reset();
                self.guard.resolve();
                self.run_state = RunState::Stopped;
            }
        }
        events
    }

    pub fn set_work_minutes(&mut self, minutes: i64) -> Option<Event> {
        self.set_minutes(SessionKind::Work, minutes)
    }

    pub fn set_break_minutes(&mut self, minutes: i64) -> Option<Event> {
        self.set_minutes(SessionKind::Break, minutes)
    }

    /// Apply a raw text edit of the Work duration.
    pub fn set_work_minutes_text(&mut self, text: &str) -> Option<Event> {
        self.set_minutes(SessionKind::Work, parse_minutes(SessionKind::Work, text) as i64)
    }

    /// Apply a raw text edit of the Break duration.
    pub fn set_break_minutes_text(&mut self, text: &str) -> Option<Event> {
        self.set_minutes(SessionKind::Break, parse_minutes(SessionKind::Break, text) as i64)
    }

    /// Lift an expired lockout. Runs on every tick; shells should also call
    /// it when resuming from the background.
    pub fn check_day_rollover(&mut self) -> Option<Event> {
        if !self.ledger.check_rollover(self.day.today()) {
            return None;
        }
        self.run_state = RunState::Stopped;
        self.pause_requested = false;
        self.guard.resolve();
        self.clock.reset();
        Some(Event::LockoutLifted {
            lives: self.ledger.lives(),
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_minutes(&mut self, kind: SessionKind, minutes: i64) -> Option<Event> {
        if self.phase() != Phase::Idle {
            return None;
        }
        let changed = match kind {
            SessionKind::Work => self.clock.set_work_minutes(minutes, self.run_state),
            SessionKind::Break => self.clock.set_break_minutes(minutes, self.run_state),
        };
        if !changed {
            return None;
        }
        Some(Event::DurationChanged {
            kind,
            minutes: self.clock.duration_for(kind) / 60,
            at: Utc::now(),
        })
    }

    fn complete_session(&mut self, events: &mut Vec<Event>) {
        let kind = self.clock.kind();
        info!(?kind, "session complete");
        events.push(Event::SessionCompleted {
            kind,
            duration_secs: self.clock.total_secs(),
            at: Utc::now(),
        });

        if kind == SessionKind::Work {
            if let LifeChange::Gained { lives } = self.ledger.gain_life() {
                events.push(Event::LifeGained {
                    lives,
                    at: Utc::now(),
                });
            }
        }

        self.clock.switch_kind();
        self.guard.clear();
        self.run_state = RunState::Running;
        events.push(Event::SessionSwitched {
            kind: self.clock.kind(),
            duration_secs: self.clock.total_secs(),
            at: Utc::now(),
        });
    }

    fn lose_life(&mut self, reason: &str, events: &mut Vec<Event>) {
        let today = self.day.today();
        match self.ledger.lose_life(today, reason) {
            LifeChange::Lost { remaining } => events.push(Event::LifeLost {
                remaining,
                at: Utc::now(),
            }),
            LifeChange::LockedOut { date } => {
                events.push(Event::LifeLost {
                    remaining: 0,
                    at: Utc::now(),
                });
                events.push(Event::LockedOut {
                    date,
                    at: Utc::now(),
                });
                self.run_state = RunState::Stopped;
                self.pause_requested = false;
                self.guard.resolve();
            }
            LifeChange::Unchanged | LifeChange::Gained { .. } => {}
        }
    }

    fn report(&self, events: Vec<Event>) -> TickReport {
        TickReport {
            events,
            snapshot: self.snapshot(),
        }
    }
}
