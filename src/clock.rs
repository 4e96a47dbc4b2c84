use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::shared::AppError;

/// Source of the current instant, injected so progression rules can be replayed at any date
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        to_day(self.now())
    }
}

pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to midnight UTC of `day`
    pub fn at_day(day: NaiveDate) -> Self {
        Self::new(start_of_day(day))
    }

    fn instant(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.instant() = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.instant();
        *now += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant()
    }
}

/// Truncates an instant to its UTC calendar day
pub fn to_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar day, discarding time of day
pub fn parse_day(input: &str) -> Result<NaiveDate, AppError> {
    let trimmed = input.trim();

    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| to_day(instant.with_timezone(&Utc)))
        .map_err(|_| AppError::InvalidDate(input.to_string()))
}

/// Whole days from `from` to `to`; negative when `to` is earlier
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// The `days` calendar days ending at `end` (inclusive), walking backwards from `end`
pub fn trailing_window(end: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(days)).map(move |offset| end - Duration::days(offset))
}
