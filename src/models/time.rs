//! Minute-precision wall-clock times and half-open time slots.
//!
//! Exam sessions never cross midnight, so a slot is a pair of same-day
//! clock times. All interval reasoning in the crate goes through
//! [`TimeSlot::overlaps`] and [`TimeSlot::contains`] so the half-open
//! `[start, end)` convention lives in exactly one place.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors produced when constructing clock times or slots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("invalid clock time '{0}', expected HH:MM")]
    InvalidClock(String),
    #[error("slot start {start} must be strictly before end {end}")]
    EmptySlot { start: ClockTime, end: ClockTime },
}

/// A wall-clock time of day with minute precision.
///
/// Serialized as `"HH:MM"`. Ordering is lexicographic on the 24-hour
/// rendering, which coincides with chronological order within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Build a clock time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(ClockTime)
            .ok_or_else(|| TimeError::InvalidClock(format!("{:02}:{:02}", hour, minute)))
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        use chrono::Timelike;
        self.0.hour() * 60 + self.0.minute()
    }

    /// Add a duration in minutes, wrapping around midnight within the day.
    pub fn add_minutes(&self, minutes: u32) -> Self {
        let (t, _wrapped) = self
            .0
            .overflowing_add_signed(TimeDelta::minutes(i64::from(minutes)));
        ClockTime(t)
    }

    /// Anchor this clock time on a calendar date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(ClockTime)
            .map_err(|_| TimeError::InvalidClock(s.to_string()))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A half-open `[start, end)` interval within a single day.
///
/// The `start < end` invariant is enforced at construction; a `TimeSlot`
/// value is always non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    /// Create a slot, rejecting empty and inverted intervals.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, TimeError> {
        if start >= end {
            return Err(TimeError::EmptySlot { start, end });
        }
        Ok(TimeSlot { start, end })
    }

    /// Derive a slot from a start time and a duration in minutes.
    ///
    /// The end time is computed with minute-precision wraparound; a
    /// duration that crosses midnight produces an inverted interval and is
    /// rejected like any other empty slot.
    pub fn from_duration(start: ClockTime, minutes: u32) -> Result<Self, TimeError> {
        Self::new(start, start.add_minutes(minutes))
    }

    /// Whether two slots share any instant.
    ///
    /// Half-open semantics: back-to-back slots (`a.end == b.start`) do not
    /// overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this slot.
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Slot length in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes_from_midnight() - self.start.minutes_from_midnight()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
