//! Conflict detection for candidate sessions.
//!
//! A candidate is checked against the committed session set along two
//! resource dimensions: the classroom (a single exclusive resource) and
//! every student group it involves. Both checks use the half-open interval
//! overlap rule from [`TimeSlot::overlaps`]. The report enumerates every
//! collision so callers can surface complete human-readable reasons, with
//! classroom conflicts ordered before group conflicts.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::api::{ClassroomId, GroupId, SessionId, SubjectId};
use crate::db::repository::{RepositoryResult, SessionRepository};
use crate::models::{Session, TimeSlot};

/// The placement fields of a candidate session.
#[derive(Debug, Clone)]
pub struct SessionCandidate {
    pub classroom: ClassroomId,
    pub groups: Vec<GroupId>,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// A committed session the candidate collides with.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictingSession {
    pub id: SessionId,
    pub subject: SubjectId,
    pub slot: TimeSlot,
}

impl From<&Session> for ConflictingSession {
    fn from(s: &Session) -> Self {
        ConflictingSession {
            id: s.id,
            subject: s.subject,
            slot: s.slot,
        }
    }
}

/// All sessions colliding with the candidate in its classroom.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomConflict {
    pub classroom: ClassroomId,
    pub sessions: Vec<ConflictingSession>,
}

/// All sessions colliding with the candidate for one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupConflict {
    pub group: GroupId,
    pub sessions: Vec<ConflictingSession>,
}

/// The full conflict picture for a candidate.
///
/// Empty report means the placement is legal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<ClassroomConflict>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupConflict>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.classroom.is_none() && self.groups.is_empty()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref c) = self.classroom {
            let ids: Vec<String> = c.sessions.iter().map(|s| s.id.to_string()).collect();
            parts.push(format!(
                "classroom {} occupied by session(s) {}",
                c.classroom,
                ids.join(", ")
            ));
        }
        for g in &self.groups {
            let ids: Vec<String> = g.sessions.iter().map(|s| s.id.to_string()).collect();
            parts.push(format!(
                "group {} busy in session(s) {}",
                g.group,
                ids.join(", ")
            ));
        }
        if parts.is_empty() {
            write!(f, "no conflicts")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

/// Check a candidate placement against committed sessions.
///
/// `exclude` skips one session id, which in-place updates need so a session
/// does not conflict with itself.
pub async fn validate(
    repo: &dyn SessionRepository,
    candidate: &SessionCandidate,
    exclude: Option<SessionId>,
) -> RepositoryResult<ConflictReport> {
    let mut report = ConflictReport::default();

    let occupying = repo
        .active_sessions_for_classroom(candidate.classroom, candidate.date)
        .await?;
    let colliding: Vec<ConflictingSession> = occupying
        .iter()
        .filter(|s| Some(s.id) != exclude && s.slot.overlaps(&candidate.slot))
        .map(ConflictingSession::from)
        .collect();
    if !colliding.is_empty() {
        report.classroom = Some(ClassroomConflict {
            classroom: candidate.classroom,
            sessions: colliding,
        });
    }

    for &group in &candidate.groups {
        let busy = repo.active_sessions_for_group(group, candidate.date).await?;
        let colliding: Vec<ConflictingSession> = busy
            .iter()
            .filter(|s| Some(s.id) != exclude && s.slot.overlaps(&candidate.slot))
            .map(ConflictingSession::from)
            .collect();
        if !colliding.is_empty() {
            report.groups.push(GroupConflict {
                group,
                sessions: colliding,
            });
        }
    }

    Ok(report)
}
