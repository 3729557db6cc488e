//! Source of "today" and "now" for the day state machine.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Calendar and wall-clock source.
pub trait Clock {
    /// Local calendar date.
    fn today(&self) -> NaiveDate;

    /// Current instant, used for record timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock using the host's local timezone for calendar dates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed date and instant.
#[derive(Clone, Debug)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl FixedClock {
    /// Pin to `today`, with `now` at midday UTC on that date.
    pub fn on(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self { today, now }
    }

    /// Move forward by whole days.
    pub fn advance_days(&mut self, days: i64) {
        self.today += chrono::Duration::days(days);
        self.now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
        clock.advance_days(3);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(clock.now().date_naive(), clock.today());
    }
}
