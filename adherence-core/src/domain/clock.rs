//! Pluggable "current date" provider (§6), so tests can pin time deterministically.

use chrono::{DateTime, NaiveDate, Utc};

/// A source of the current date (and, for observation timestamps, the
/// current instant), injected rather than read from the ambient environment
/// (per the design notes' "global clock" re-architecture).
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// The current instant, used as an observation's `effective_date_time`
    /// and a patient summary's `calculated_at`. Defaults to midnight UTC on
    /// `today()` so implementations that only care about calendar-day
    /// determinism don't need to override it.
    fn now(&self) -> DateTime<Utc> {
        self.today().and_hms_opt(0, 0, 0).unwrap().and_utc()
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed date, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_now_is_midnight_on_today() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 29).unwrap();
        let clock = FixedClock(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().date_naive(), date);
    }
}
