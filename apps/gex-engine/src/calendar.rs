//! Market session calendar.
//!
//! Session windows are compared against whatever naive time the injected
//! [`Clock`] returns, so that clock must read in the exchange's time zone.
//! Injection also keeps time-windowed heuristics reproducible in tests.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::config::SessionConfig;

/// Source of the current time in the exchange's time zone.
pub trait Clock: Send + Sync {
    /// Current exchange-local time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the host's local time zone.
///
/// Only exchange-local when the host runs in the exchange's zone (for US
/// equities, `TZ=America/New_York`). Elsewhere, inject a [`Clock`] that
/// converts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Third Friday of the month, the standard monthly expiration.
#[must_use]
pub fn third_friday(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Fri, 3)
}

/// Session hours and event windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCalendar {
    open: NaiveTime,
    close: NaiveTime,
    friday_afternoon_hour: u32,
}

impl Default for SessionCalendar {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SessionCalendar {
    /// Build from session configuration.
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Self {
        Self {
            open: config.open,
            close: config.close,
            friday_afternoon_hour: config.friday_afternoon_hour,
        }
    }

    /// First or last hour of the regular session.
    #[must_use]
    pub fn is_institutional_window(&self, now: NaiveDateTime) -> bool {
        let t = now.time();
        let first_hour_end = self.open + Duration::hours(1);
        let last_hour_start = self.close - Duration::hours(1);

        (t >= self.open && t < first_hour_end) || (t >= last_hour_start && t < self.close)
    }

    /// Within five days before (or on) the month's third Friday.
    #[must_use]
    pub fn is_opex_week(&self, date: NaiveDate) -> bool {
        third_friday(date.year(), date.month()).is_some_and(|opex| {
            let days = (opex - date).num_days();
            (0..=5).contains(&days)
        })
    }

    /// OPEX week in a quarterly expiration month.
    #[must_use]
    pub fn is_quad_witching_week(&self, date: NaiveDate) -> bool {
        matches!(date.month(), 3 | 6 | 9 | 12) && self.is_opex_week(date)
    }

    /// Friday at or after the configured afternoon hour.
    #[must_use]
    pub fn is_friday_afternoon(&self, now: NaiveDateTime) -> bool {
        now.weekday() == Weekday::Fri && now.hour() >= self.friday_afternoon_hour
    }
}
