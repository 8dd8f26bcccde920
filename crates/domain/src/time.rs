//! Time and timestamp helpers.
//!
//! Reservations are booked on a calendar date with a same-day `HH:mm` window.
//! [`ClockTime`] and [`TimeWindow`] carry the parsing and duration rules so
//! that the pricing code only ever sees a validated, positive duration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `updated_at`, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time, truncated to microseconds so that it survives
/// a round trip through storage unchanged.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

const MINUTES_PER_HOUR: u16 = 60;

/// A wall-clock time of day with minute precision, written `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Build a time from hour and minute components.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTime`] when the components are out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= MINUTES_PER_HOUR {
            return Err(ValidationError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self {
            minutes: hour * MINUTES_PER_HOUR + minute,
        })
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    #[must_use]
    pub fn hour(self) -> u16 {
        self.minutes / MINUTES_PER_HOUR
    }

    #[must_use]
    pub fn minute(self) -> u16 {
        self.minutes % MINUTES_PER_HOUR
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    /// Accepts `H:mm` or `HH:mm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let well_formed = (1..=2).contains(&hour.len())
            && minute.len() == 2
            && hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(invalid());
        }

        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A same-day booking window where `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: ClockTime,
    end: ClockTime,
}

impl TimeWindow {
    /// # Errors
    ///
    /// Returns [`ValidationError::EndNotAfterStart`] when the window is empty
    /// or would span midnight.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(self) -> ClockTime {
        self.start
    }

    #[must_use]
    pub fn end(self) -> ClockTime {
        self.end
    }

    /// Length of the window in minutes, always positive.
    #[must_use]
    pub fn duration_minutes(self) -> u16 {
        self.end.minutes - self.start.minutes
    }

    /// Length of the window in (possibly fractional) hours.
    #[must_use]
    pub fn hours(self) -> f64 {
        f64::from(self.duration_minutes()) / f64::from(MINUTES_PER_HOUR)
    }
}

/// Parse a reservation date.
///
/// Accepts a plain ISO date (`2024-01-15`) or a full RFC 3339 timestamp, in
/// which case the UTC calendar date is kept.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when neither form matches.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::from_str(trimmed) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.to_utc().date_naive())
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> ClockTime {
        raw.parse().unwrap()
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now().trunc_subsecs(6);
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_parse_clock_time_into_minutes_since_midnight() {
        assert_eq!(t("00:00").minutes_since_midnight(), 0);
        assert_eq!(t("09:30").minutes_since_midnight(), 570);
        assert_eq!(t("9:30").minutes_since_midnight(), 570);
        assert_eq!(t("23:59").minutes_since_midnight(), 1439);
    }

    #[test]
    fn should_reject_malformed_clock_times() {
        for raw in ["", "9", "24:00", "12:60", "12:5", "ab:cd", "12:30:00", "-1:30", "+9:30"] {
            assert_eq!(
                raw.parse::<ClockTime>(),
                Err(ValidationError::InvalidTime(raw.to_string())),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn should_display_clock_time_zero_padded() {
        assert_eq!(t("9:05").to_string(), "09:05");
    }

    #[test]
    fn should_roundtrip_clock_time_through_serde_as_string() {
        let json = serde_json::to_string(&t("17:00")).unwrap();
        assert_eq!(json, "\"17:00\"");
        let parsed: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t("17:00"));
    }

    #[test]
    fn should_compute_fractional_hours_for_window() {
        let window = TimeWindow::new(t("09:00"), t("10:30")).unwrap();
        assert_eq!(window.duration_minutes(), 90);
        assert!((window.hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_window_when_end_is_before_start() {
        let result = TimeWindow::new(t("10:00"), t("09:00"));
        assert_eq!(result, Err(ValidationError::EndNotAfterStart));
    }

    #[test]
    fn should_reject_window_when_end_equals_start() {
        let result = TimeWindow::new(t("10:00"), t("10:00"));
        assert_eq!(result, Err(ValidationError::EndNotAfterStart));
    }

    #[test]
    fn should_parse_plain_iso_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn should_keep_date_part_of_rfc3339_timestamp() {
        let date = parse_date("2024-01-15T08:00:00Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn should_reject_invalid_date() {
        assert!(matches!(
            parse_date("15/01/2024"),
            Err(ValidationError::InvalidDate(_))
        ));
    }
}
