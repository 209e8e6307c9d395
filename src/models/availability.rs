//! Teacher availability patterns and date-specific exceptions.
//!
//! A teacher's free time is described by two layers:
//!
//! - [`RecurringAvailability`]: standing weekly windows ("Monday 09:00 to
//!   12:00"). A teacher may own several, possibly overlapping, windows per
//!   weekday. Absent any window, the default is unavailable.
//! - [`AvailabilityException`]: a date-specific override in either
//!   direction. Exceptions take priority over the recurring pattern for the
//!   interval they cover, so a normally free Monday morning can be blocked
//!   and a normally busy one opened.
//!
//! The resolution logic combining these with committed sessions lives in
//! `services::availability`.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::api::TeacherId;
use crate::models::time::TimeSlot;

/// A standing weekly availability window owned by a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringAvailability {
    pub teacher: TeacherId,
    pub weekday: Weekday,
    pub slot: TimeSlot,
}

impl RecurringAvailability {
    /// Whether this window applies on the given calendar date and fully
    /// covers the candidate slot.
    pub fn covers(&self, date: NaiveDate, slot: &TimeSlot) -> bool {
        use chrono::Datelike;
        self.weekday == date.weekday() && self.slot.contains(slot)
    }
}

/// A date-specific availability override owned by a teacher.
///
/// `is_available = false` blocks the covered interval regardless of the
/// recurring pattern; `is_available = true` opens it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub teacher: TeacherId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub is_available: bool,
}

impl AvailabilityException {
    /// Whether this exception has any bearing on the candidate interval.
    pub fn touches(&self, date: NaiveDate, slot: &TimeSlot) -> bool {
        self.date == date && self.slot.overlaps(slot)
    }

    /// Whether this exception opens an interval wide enough for the whole
    /// candidate slot.
    pub fn opens(&self, date: NaiveDate, slot: &TimeSlot) -> bool {
        self.is_available && self.date == date && self.slot.contains(slot)
    }
}
