//! Wall-clock `HH:MM` values used for departure and meal times.

use std::{fmt, str::FromStr};

use jiff::{civil::Time, SignedDuration};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MapzipError;

const MORNING_PREFIX: &str = "오전";
const AFTERNOON_PREFIX: &str = "오후";

/// A time of day with minute precision.
///
/// Serializes as `"HH:MM"`. Parsing also accepts the backend's Korean
/// 12-hour rendering (`"오후 12:30"`), so records that went through the
/// route calculator decode the same way as ones entered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(Time);

impl ClockTime {
    /// 12:00, the departure time a new draft starts with.
    pub const NOON: ClockTime = ClockTime(Time::constant(12, 0, 0, 0));

    /// Creates a clock time, rejecting out-of-range components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, MapzipError> {
        if hour > 23 || minute > 59 {
            return Err(MapzipError::validation("time")
                .with_reason(format!("{hour:02}:{minute:02} is not a valid time of day")));
        }
        // Both components were range-checked above, so they fit in i8.
        Time::new(hour as i8, minute as i8, 0, 0)
            .map(Self)
            .map_err(|e| MapzipError::validation("time").with_reason(e.to_string()))
    }

    pub fn hour(&self) -> u8 {
        self.0.hour() as u8
    }

    pub fn minute(&self) -> u8 {
        self.0.minute() as u8
    }

    /// Adds minutes without wrapping past midnight.
    ///
    /// Returns `None` when the result would land on the next day.
    pub fn checked_add_minutes(&self, minutes: i64) -> Option<Self> {
        self.0
            .checked_add(SignedDuration::from_mins(minutes))
            .ok()
            .map(Self)
    }

    /// Underlying civil time.
    pub fn as_civil(&self) -> Time {
        self.0
    }
}

fn parse_hour_minute(s: &str) -> Option<(u8, u8)> {
    let (hour, minute) = s.trim().split_once(':')?;
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return None;
    }
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

impl FromStr for ClockTime {
    type Err = MapzipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            MapzipError::validation("time").with_reason(format!("'{s}' is not an HH:MM time"))
        };
        let trimmed = s.trim();

        let twelve_hour = |rest: &str, afternoon: bool| -> Result<Self, MapzipError> {
            let (hour, minute) = parse_hour_minute(rest).ok_or_else(invalid)?;
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            let hour = match (hour, afternoon) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            };
            Self::new(hour, minute)
        };

        if let Some(rest) = trimmed.strip_prefix(MORNING_PREFIX) {
            twelve_hour(rest, false)
        } else if let Some(rest) = trimmed.strip_prefix(AFTERNOON_PREFIX) {
            twelve_hour(rest, true)
        } else {
            let (hour, minute) = parse_hour_minute(trimmed).ok_or_else(invalid)?;
            Self::new(hour, minute).map_err(|_| invalid())
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
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
        raw.parse().map_err(de::Error::custom)
    }
}
