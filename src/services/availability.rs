//! Availability resolution for teachers and classrooms.
//!
//! Teacher availability combines three layers, first matching rule wins:
//!
//! 1. Date-specific exceptions override the recurring pattern for the
//!    interval they cover, in either direction.
//! 2. Absent a relevant exception, the candidate slot must be fully inside
//!    at least one recurring window for that weekday. Partial coverage
//!    counts as unavailable.
//! 3. Even an available teacher must not already supervise an overlapping
//!    non-cancelled session that date.
//!
//! Classrooms are binary resources with no pattern or exceptions; only the
//! commitment check applies to them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{Classroom, ClassroomId, SessionId, TeacherId};
use crate::db::repository::{
    AvailabilityRepository, DirectoryRepository, FullRepository, RepositoryResult,
    SessionRepository,
};
use crate::models::TimeSlot;

/// Why an availability check resolved negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnavailableReason {
    /// A blocking exception covers part of the candidate interval.
    ExceptionBlock,
    /// No recurring window (or opening exception) covers the whole slot.
    OutsidePattern,
    /// An overlapping session is already committed for the resource.
    DoubleBooked,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
}

impl Availability {
    pub fn free() -> Self {
        Availability {
            available: true,
            reason: None,
        }
    }

    pub fn blocked(reason: UnavailableReason) -> Self {
        Availability {
            available: false,
            reason: Some(reason),
        }
    }
}

/// A teacher that failed availability resolution, with the failing reason.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorVerdict {
    pub id: TeacherId,
    pub name: String,
    pub reason: UnavailableReason,
}

/// Per-teacher availability with supervision load, for assignment UIs.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherAvailability {
    pub id: TeacherId,
    pub name: String,
    #[serde(flatten)]
    pub availability: Availability,
    pub daily_sessions: usize,
    pub weekly_sessions: usize,
}

/// Per-classroom availability.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomAvailability {
    pub id: ClassroomId,
    pub name: String,
    #[serde(flatten)]
    pub availability: Availability,
}

/// Resolve whether a teacher can supervise the candidate interval.
///
/// Pure over repository state: identical store contents and arguments give
/// identical results.
pub async fn resolve_teacher(
    repo: &dyn FullRepository,
    teacher: TeacherId,
    date: NaiveDate,
    slot: &TimeSlot,
    exclude: Option<SessionId>,
) -> RepositoryResult<Availability> {
    let exceptions = repo.exceptions_for_teacher_on(teacher, date).await?;
    let relevant: Vec<_> = exceptions
        .iter()
        .filter(|e| e.touches(date, slot))
        .collect();

    // An exception decides the overlap it covers, overriding the pattern.
    if relevant.iter().any(|e| !e.is_available) {
        return Ok(Availability::blocked(UnavailableReason::ExceptionBlock));
    }
    let opened = relevant.iter().any(|e| e.opens(date, slot));

    if !opened {
        let pattern = repo.recurring_for_teacher(teacher).await?;
        let covered = pattern.iter().any(|w| w.covers(date, slot));
        if !covered {
            return Ok(Availability::blocked(UnavailableReason::OutsidePattern));
        }
    }

    let committed = repo.active_sessions_for_supervisor(teacher, date).await?;
    let double_booked = committed
        .iter()
        .any(|s| Some(s.id) != exclude && s.slot.overlaps(slot));
    if double_booked {
        return Ok(Availability::blocked(UnavailableReason::DoubleBooked));
    }

    Ok(Availability::free())
}

/// Availability of the given classrooms for one interval.
///
/// Classrooms carry no recurring pattern; only committed sessions matter.
pub async fn classroom_availability(
    repo: &dyn FullRepository,
    classrooms: &[Classroom],
    date: NaiveDate,
    slot: &TimeSlot,
    exclude: Option<SessionId>,
) -> RepositoryResult<Vec<ClassroomAvailability>> {
    let mut out = Vec::with_capacity(classrooms.len());
    for classroom in classrooms {
        let occupied = repo
            .active_sessions_for_classroom(classroom.id, date)
            .await?
            .iter()
            .any(|s| Some(s.id) != exclude && s.slot.overlaps(slot));
        let availability = if occupied {
            Availability::blocked(UnavailableReason::DoubleBooked)
        } else {
            Availability::free()
        };
        out.push(ClassroomAvailability {
            id: classroom.id,
            name: classroom.name.clone(),
            availability,
        });
    }
    out.sort_by_key(|c| c.id);
    Ok(out)
}

/// Resolve every teacher in the directory against one interval, with their
/// daily and weekly supervision load. Results are merged in teacher-id
/// order regardless of resolution order.
pub async fn teacher_availability_overview(
    repo: &dyn FullRepository,
    date: NaiveDate,
    slot: &TimeSlot,
    exclude: Option<SessionId>,
) -> RepositoryResult<Vec<TeacherAvailability>> {
    let teachers = repo.list_teachers().await?;
    let mut out = Vec::with_capacity(teachers.len());
    for teacher in teachers {
        let availability = resolve_teacher(repo, teacher.id, date, slot, exclude).await?;
        let load = repo.supervisor_load(teacher.id, date).await?;
        out.push(TeacherAvailability {
            id: teacher.id,
            name: teacher.name,
            availability,
            daily_sessions: load.daily_sessions,
            weekly_sessions: load.weekly_sessions,
        });
    }
    out.sort_by_key(|t| t.id);
    Ok(out)
}
