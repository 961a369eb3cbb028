//! Enumerations and field types for tasks.
//!
//! This module defines the structured values a task carries besides plain text:
//! the three-state `Status` and the `Timestamp` wire type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task completion status.
///
/// The serialized forms are exactly the strings the backend stores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Status {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "on going")]
    #[value(name = "on-going", alias = "ongoing")]
    OnGoing,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    /// All statuses in segmented-control order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::OnGoing, Status::Done];

    /// The string sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::OnGoing => "on going",
            Status::Done => "done",
        }
    }

    /// Next status in control order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Status::Pending => Status::OnGoing,
            Status::OnGoing => Status::Done,
            Status::Done => Status::Pending,
        }
    }

    /// Previous status in control order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Status::Pending => Status::Done,
            Status::OnGoing => Status::Pending,
            Status::Done => Status::OnGoing,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three status values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}', expected one of: pending, on going, done")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "on going" | "on-going" | "ongoing" => Ok(Status::OnGoing),
            "done" => Ok(Status::Done),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A point in time (due dates, server timestamps), held in UTC and
/// transmitted as ISO-8601 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Local midnight of the given calendar day.
    pub fn from_local_day(day: NaiveDate) -> Self {
        let midnight = day.and_time(NaiveTime::MIN);
        let at = match Local.from_local_datetime(&midnight).earliest() {
            Some(local) => local.with_timezone(&Utc),
            // Midnight skipped by a DST jump; fall back to reading it as UTC.
            None => Utc.from_utc_datetime(&midnight),
        };
        Timestamp(at)
    }

    /// The calendar day this instant falls on in local time.
    pub fn local_day(&self) -> NaiveDate {
        self.0.with_timezone(&Local).date_naive()
    }

    /// Wire form: RFC 3339 in UTC, millisecond precision, `Z` suffix.
    pub fn to_wire(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse any of the date forms the backend is known to return.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(at.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Some(Timestamp(Utc.from_utc_datetime(&naive)));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|day| Timestamp(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_string(&Status::OnGoing).unwrap(), "\"on going\"");
        let parsed: Status = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(parsed, Status::Done);
        assert!(serde_json::from_str::<Status>("\"archived\"").is_err());
    }

    #[test]
    fn status_from_str_accepts_cli_spellings() {
        assert_eq!("on-going".parse::<Status>().unwrap(), Status::OnGoing);
        assert_eq!(" Pending ".parse::<Status>().unwrap(), Status::Pending);
        assert!("later".parse::<Status>().is_err());
    }

    #[test]
    fn status_cycles_through_all_three() {
        let mut s = Status::Pending;
        for _ in 0..3 {
            s = s.next();
        }
        assert_eq!(s, Status::Pending);
        assert_eq!(Status::Pending.prev(), Status::Done);
    }

    #[test]
    fn due_date_parses_backend_forms() {
        let zulu = Timestamp::parse("2025-03-01T03:00:00.000Z").unwrap();
        let naive = Timestamp::parse("2025-03-01T03:00:00").unwrap();
        let offset = Timestamp::parse("2025-03-01T00:00:00-03:00").unwrap();
        assert_eq!(zulu, naive);
        assert_eq!(zulu, offset);
        assert!(Timestamp::parse("2025-03-01").is_some());
        assert!(Timestamp::parse("next week").is_none());
    }

    #[test]
    fn due_date_wire_form_is_utc_millis() {
        let due = Timestamp::parse("2025-03-01T00:00:00-03:00").unwrap();
        assert_eq!(due.to_wire(), "2025-03-01T03:00:00.000Z");
    }

    #[test]
    fn local_day_survives_round_trip() {
        let day = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        assert_eq!(Timestamp::from_local_day(day).local_day(), day);
    }
}
