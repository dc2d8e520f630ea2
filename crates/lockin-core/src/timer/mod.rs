mod clock;
mod controller;
mod guard;

pub use clock::{
    clamp_minutes, digits_only, parse_minutes, RunState, SessionClock, SessionKind,
    DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES, MAX_BREAK_MINUTES, MAX_WORK_MINUTES,
    MIN_MINUTES,
};
pub use controller::{AlertResolution, Phase, Prompt, SessionController, TickReport};
pub use guard::{Escalation, FocusGuard, DEFAULT_ALERT_THRESHOLD_SECS};
