//! Time-derived session status.
//!
//! The stored lifecycle state is only `scheduled` or `cancelled`; the
//! phases in between are a function of the clock and are computed on every
//! read. Nothing here touches storage.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::api::{ClassroomId, GroupId, SectionId, SessionId, SubjectId, TeacherId};
use crate::models::{ExamType, LifecyclePhase, Session, StoredStatus, TimeSlot};

/// Derive the display lifecycle phase for a session interval.
///
/// Cancellation always wins. Otherwise the phase follows the half-open
/// interval `[start, end)`: a session is ongoing from its start instant and
/// completed from its end instant.
pub fn display_phase(
    stored: StoredStatus,
    date: NaiveDate,
    slot: TimeSlot,
    now: NaiveDateTime,
) -> LifecyclePhase {
    if stored == StoredStatus::Cancelled {
        return LifecyclePhase::Cancelled;
    }
    let start = slot.start.on(date);
    let end = slot.end.on(date);
    if now < start {
        LifecyclePhase::Scheduled
    } else if now < end {
        LifecyclePhase::Ongoing
    } else {
        LifecyclePhase::Completed
    }
}

/// A session as returned to callers: the stored record plus the computed
/// lifecycle phase. The persisted status is never rewritten by a read.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub classroom: ClassroomId,
    pub groups: Vec<GroupId>,
    pub supervisors: Vec<TeacherId>,
    pub sections: Vec<SectionId>,
    /// Computed lifecycle phase.
    pub status: LifecyclePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
}

impl SessionView {
    /// Project a stored session through the status resolver.
    pub fn resolve(session: &Session, now: NaiveDateTime) -> Self {
        SessionView {
            id: session.id,
            subject: session.subject,
            date: session.date,
            slot: session.slot,
            classroom: session.classroom,
            groups: session.groups.clone(),
            supervisors: session.supervisors.clone(),
            sections: session.sections.clone(),
            status: display_phase(session.status, session.date, session.slot, now),
            exam_type: session.exam_type,
        }
    }
}
