//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies accept the legacy wire format of the session API: a
//! single `status` string covering both lifecycle and exam-type tags, and
//! an `end_time`/`exam_duration` alternative for the slot end. Conversion
//! into the internal model happens here so handlers and services only ever
//! see well-formed drafts and patches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Re-export the engine types that appear in responses.
pub use crate::api::{ClassroomId, GroupId, SectionId, SessionId, SubjectId, TeacherId};
pub use crate::scheduler::UnscheduledRequirement;
pub use crate::services::availability::{ClassroomAvailability, TeacherAvailability};
pub use crate::services::status::SessionView;

use crate::models::{
    ClockTime, SessionDraft, SessionPatch, StatusTag, StoredStatus, TimeSlot,
};

/// Request body for creating a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    /// End of the slot. May be omitted when `exam_duration` is given.
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    /// Exam length in minutes, used to derive `end_time` when absent.
    #[serde(default)]
    pub exam_duration: Option<u32>,
    pub classroom: ClassroomId,
    pub groups: Vec<GroupId>,
    pub supervisors: Vec<TeacherId>,
    /// Legacy combined status tag ("scheduled", "examen_principal", ...).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionId>,
}

impl CreateSessionRequest {
    /// Convert into a draft, deriving the end time and splitting the
    /// legacy status tag. Field-level problems come back as messages for a
    /// 400 response.
    pub fn into_draft(self) -> Result<SessionDraft, String> {
        let end = match (self.end_time, self.exam_duration) {
            (Some(end), _) => end,
            (None, Some(minutes)) => self.start_time.add_minutes(minutes),
            (None, None) => {
                return Err("either end_time or exam_duration is required".to_string())
            }
        };
        let slot = TimeSlot::new(self.start_time, end).map_err(|e| e.to_string())?;

        let tag = match self.status.as_deref() {
            Some(raw) => StatusTag::parse(raw)?,
            None => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: None,
            },
        };

        Ok(SessionDraft {
            subject: self.subject,
            date: self.date,
            slot,
            classroom: self.classroom,
            groups: self.groups,
            supervisors: self.supervisors,
            sections: self.sections,
            status: tag.stored,
            exam_type: tag.exam_type,
        })
    }
}

/// Request body for a partial session update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub subject: Option<SubjectId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<ClockTime>,
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    #[serde(default)]
    pub classroom: Option<ClassroomId>,
    #[serde(default)]
    pub groups: Option<Vec<GroupId>>,
    #[serde(default)]
    pub supervisors: Option<Vec<TeacherId>>,
    #[serde(default)]
    pub sections: Option<Vec<SectionId>>,
    /// Legacy combined status tag.
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateSessionRequest {
    /// Convert into a patch. A time change must supply both ends of the
    /// slot so the invariant can be checked here.
    pub fn into_patch(self) -> Result<SessionPatch, String> {
        let slot = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(TimeSlot::new(start, end).map_err(|e| e.to_string())?),
            (None, None) => None,
            _ => {
                return Err(
                    "start_time and end_time must be updated together".to_string(),
                )
            }
        };

        let (status, exam_type) = match self.status.as_deref() {
            Some(raw) => {
                let tag = StatusTag::parse(raw)?;
                (Some(tag.stored), tag.exam_type)
            }
            None => (None, None),
        };

        Ok(SessionPatch {
            subject: self.subject,
            date: self.date,
            slot,
            classroom: self.classroom,
            groups: self.groups,
            supervisors: self.supervisors,
            sections: self.sections,
            status,
            exam_type,
        })
    }
}

/// Response for a session update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateSessionResponse {
    pub session: SessionView,
    /// Supervisors added to or removed from the session by this update.
    pub affected_supervisors: Vec<TeacherId>,
}

/// Response for a session deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSessionResponse {
    /// Supervisors who were assigned to the removed session.
    pub affected_supervisors: Vec<TeacherId>,
}

/// Session list response.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
    pub total: usize,
}

/// One slot of the daily template in a generation request.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotTemplateEntry {
    pub start: ClockTime,
    pub end: ClockTime,
}

/// Request body for batch schedule generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateScheduleRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_slots: Vec<SlotTemplateEntry>,
    /// Optional wall-clock budget for the run, in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Response for batch schedule generation. Partial results are included;
/// inspect `unscheduled` for what could not be placed.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateScheduleResponse {
    pub count: usize,
    pub data: Vec<SessionView>,
    pub unscheduled: Vec<UnscheduledRequirement>,
}

/// Query parameters for the availability endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Session to exclude from commitment checks, for edit dialogs.
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Storage backend status
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExamType;

    fn base_request() -> CreateSessionRequest {
        CreateSessionRequest {
            subject: SubjectId::new(1),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start_time: "09:00".parse().unwrap(),
            end_time: Some("11:00".parse().unwrap()),
            exam_duration: None,
            classroom: ClassroomId::new(1),
            groups: vec![GroupId::new(1)],
            supervisors: vec![TeacherId::new(1)],
            status: None,
            sections: vec![],
        }
    }

    #[test]
    fn test_explicit_end_time_wins() {
        let mut req = base_request();
        req.exam_duration = Some(30);
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.slot.end.to_string(), "11:00");
    }

    #[test]
    fn test_end_time_derived_from_duration() {
        let mut req = base_request();
        req.end_time = None;
        req.exam_duration = Some(90);
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.slot.end.to_string(), "10:30");
    }

    #[test]
    fn test_missing_end_and_duration_rejected() {
        let mut req = base_request();
        req.end_time = None;
        req.exam_duration = None;
        assert!(req.into_draft().is_err());
    }

    #[test]
    fn test_duration_wrapping_past_midnight_rejected() {
        let mut req = base_request();
        req.start_time = "23:30".parse().unwrap();
        req.end_time = None;
        req.exam_duration = Some(60);
        assert!(req.into_draft().is_err());
    }

    #[test]
    fn test_status_tag_split() {
        let mut req = base_request();
        req.status = Some("examen_tp".to_string());
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.status, StoredStatus::Scheduled);
        assert_eq!(draft.exam_type, Some(ExamType::ExamenTp));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut req = base_request();
        req.status = Some("paused".to_string());
        assert!(req.into_draft().is_err());
    }

    #[test]
    fn test_update_times_must_come_together() {
        let req = UpdateSessionRequest {
            start_time: Some("10:00".parse().unwrap()),
            ..Default::default()
        };
        assert!(req.into_patch().is_err());

        let req = UpdateSessionRequest {
            start_time: Some("10:00".parse().unwrap()),
            end_time: Some("12:00".parse().unwrap()),
            ..Default::default()
        };
        let patch = req.into_patch().unwrap();
        assert!(patch.slot.is_some());
    }
}
