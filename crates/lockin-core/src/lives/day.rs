use chrono::{Days, Local, NaiveDate};
use std::sync::{Arc, Mutex};

/// Source of the current calendar day.
///
/// Lockout is a calendar-day rule, so the ledger and controller only ever
/// ask for a date, never a timestamp.
pub trait DayClock {
    fn today(&self) -> NaiveDate;
}

/// The local calendar day from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDay;

impl DayClock for LocalDay {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A day that only changes when told to. Clones share the same date, so a
/// test can keep one handle and advance the day under a running controller.
#[derive(Debug, Clone)]
pub struct ManualDay {
    day: Arc<Mutex<NaiveDate>>,
}

impl ManualDay {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Arc::new(Mutex::new(day)),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        *self.day.lock().unwrap_or_else(|e| e.into_inner()) = day;
    }

    pub fn advance_days(&self, days: u64) {
        let mut day = self.day.lock().unwrap_or_else(|e| e.into_inner());
        *day = day.checked_add_days(Days::new(days)).unwrap_or(*day);
    }
}

impl DayClock for ManualDay {
    fn today(&self) -> NaiveDate {
        *self.day.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_day_clones_share_state() {
        let day = ManualDay::new(NaiveDate::from_ymd_opt(2026, 2, 6).unwrap());
        let handle = day.clone();
        handle.advance_days(1);
        assert_eq!(day.today(), NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
        handle.set(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        handle.advance_days(1);
        assert_eq!(day.today(), NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }
}
