//! Exam session records and the status model.
//!
//! The upstream data model stored a single `status` string that mixed two
//! unrelated tag families: lifecycle phases ("scheduled", "cancelled", ...)
//! and exam classifications ("examen_principal", ...). Here the field is
//! split into two attributes:
//!
//! - [`StoredStatus`]: what is persisted. Only `Scheduled` and `Cancelled`
//!   exist at rest; the intermediate phases are a function of time and are
//!   computed on read (`services::status`), never written back.
//! - [`ExamType`]: an optional classification tag, persisted explicitly and
//!   orthogonal to the lifecycle.
//!
//! [`StatusTag`] keeps wire compatibility with the old single-field format.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{ClassroomId, GroupId, SectionId, SessionId, SubjectId, TeacherId};
use crate::models::time::TimeSlot;

/// Lifecycle state persisted with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
    Scheduled,
    /// Terminal. A cancelled session releases its resources and accepts no
    /// further transitions.
    Cancelled,
}

/// Display lifecycle phase, derived from stored status and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

/// Exam classification tag, independent of lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    DevoirSurveille,
    ExamenTp,
    ExamenPrincipal,
    ExamenRattrapage,
}

/// The two attributes encoded by the legacy single status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTag {
    pub stored: StoredStatus,
    pub exam_type: Option<ExamType>,
}

impl StatusTag {
    /// Parse a legacy status string into its lifecycle and exam-type parts.
    ///
    /// `ongoing` and `completed` are accepted for wire compatibility but
    /// coerce to `Scheduled`: those phases are derived from time, never
    /// persisted. Unknown tags are rejected.
    pub fn parse(tag: &str) -> Result<Self, String> {
        let tag = tag.trim();
        let parsed = match tag {
            "scheduled" | "ongoing" | "completed" => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: None,
            },
            "cancelled" => StatusTag {
                stored: StoredStatus::Cancelled,
                exam_type: None,
            },
            "devoir_surveille" => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: Some(ExamType::DevoirSurveille),
            },
            "examen_tp" => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: Some(ExamType::ExamenTp),
            },
            "examen_principal" => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: Some(ExamType::ExamenPrincipal),
            },
            "examen_rattrapage" => StatusTag {
                stored: StoredStatus::Scheduled,
                exam_type: Some(ExamType::ExamenRattrapage),
            },
            other => return Err(format!("unknown status tag '{}'", other)),
        };
        Ok(parsed)
    }
}

/// A committed exam session.
///
/// The session exclusively owns its `(date, slot)` reservation; classroom,
/// groups, supervisors, subject and sections are references into the
/// directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub classroom: ClassroomId,
    pub groups: Vec<GroupId>,
    pub supervisors: Vec<TeacherId>,
    #[serde(default)]
    pub sections: Vec<SectionId>,
    pub status: StoredStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
}

impl Session {
    /// Whether the session currently holds its resources.
    pub fn is_active(&self) -> bool {
        self.status != StoredStatus::Cancelled
    }

    /// Whether the session reserves the given group.
    pub fn involves_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }

    /// Whether the teacher supervises this session.
    pub fn supervised_by(&self, teacher: TeacherId) -> bool {
        self.supervisors.contains(&teacher)
    }
}

/// A candidate session before it has been assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDraft {
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub classroom: ClassroomId,
    pub groups: Vec<GroupId>,
    pub supervisors: Vec<TeacherId>,
    #[serde(default)]
    pub sections: Vec<SectionId>,
    pub status: StoredStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
}

impl SessionDraft {
    /// Attach a storage-assigned id, producing the committed record.
    pub fn into_session(self, id: SessionId) -> Session {
        Session {
            id,
            subject: self.subject,
            date: self.date,
            slot: self.slot,
            classroom: self.classroom,
            groups: self.groups,
            supervisors: self.supervisors,
            sections: self.sections,
            status: self.status,
            exam_type: self.exam_type,
        }
    }
}

/// A partial update to an existing session. `None` fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPatch {
    pub subject: Option<SubjectId>,
    pub date: Option<NaiveDate>,
    pub slot: Option<TimeSlot>,
    pub classroom: Option<ClassroomId>,
    pub groups: Option<Vec<GroupId>>,
    pub supervisors: Option<Vec<TeacherId>>,
    pub sections: Option<Vec<SectionId>>,
    pub status: Option<StoredStatus>,
    pub exam_type: Option<ExamType>,
}

impl SessionPatch {
    /// Apply this patch on top of an existing record.
    pub fn apply(&self, base: &Session) -> Session {
        Session {
            id: base.id,
            subject: self.subject.unwrap_or(base.subject),
            date: self.date.unwrap_or(base.date),
            slot: self.slot.unwrap_or(base.slot),
            classroom: self.classroom.unwrap_or(base.classroom),
            groups: self.groups.clone().unwrap_or_else(|| base.groups.clone()),
            supervisors: self
                .supervisors
                .clone()
                .unwrap_or_else(|| base.supervisors.clone()),
            sections: self
                .sections
                .clone()
                .unwrap_or_else(|| base.sections.clone()),
            status: self.status.unwrap_or(base.status),
            exam_type: self.exam_type.or(base.exam_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::ClockTime;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(start.parse::<ClockTime>().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn sample_session() -> Session {
        Session {
            id: SessionId::new(1),
            subject: SubjectId::new(10),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            slot: slot("09:00", "11:00"),
            classroom: ClassroomId::new(100),
            groups: vec![GroupId::new(5)],
            supervisors: vec![TeacherId::new(7), TeacherId::new(8)],
            sections: vec![],
            status: StoredStatus::Scheduled,
            exam_type: None,
        }
    }

    #[test]
    fn test_status_tag_lifecycle_variants() {
        for tag in ["scheduled", "ongoing", "completed"] {
            let parsed = StatusTag::parse(tag).unwrap();
            assert_eq!(parsed.stored, StoredStatus::Scheduled, "tag {}", tag);
            assert_eq!(parsed.exam_type, None);
        }
        let cancelled = StatusTag::parse("cancelled").unwrap();
        assert_eq!(cancelled.stored, StoredStatus::Cancelled);
    }

    #[test]
    fn test_status_tag_exam_types() {
        let parsed = StatusTag::parse("examen_rattrapage").unwrap();
        assert_eq!(parsed.stored, StoredStatus::Scheduled);
        assert_eq!(parsed.exam_type, Some(ExamType::ExamenRattrapage));

        let parsed = StatusTag::parse("devoir_surveille").unwrap();
        assert_eq!(parsed.exam_type, Some(ExamType::DevoirSurveille));
    }

    #[test]
    fn test_status_tag_rejects_unknown() {
        assert!(StatusTag::parse("archived").is_err());
        assert!(StatusTag::parse("").is_err());
    }

    #[test]
    fn test_exam_type_serde_tags() {
        let json = serde_json::to_string(&ExamType::ExamenTp).unwrap();
        assert_eq!(json, "\"examen_tp\"");
        let back: ExamType = serde_json::from_str("\"examen_principal\"").unwrap();
        assert_eq!(back, ExamType::ExamenPrincipal);
    }

    #[test]
    fn test_session_is_active() {
        let mut session = sample_session();
        assert!(session.is_active());
        session.status = StoredStatus::Cancelled;
        assert!(!session.is_active());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let base = sample_session();
        let patch = SessionPatch {
            slot: Some(slot("14:00", "16:00")),
            supervisors: Some(vec![TeacherId::new(9)]),
            ..Default::default()
        };

        let updated = patch.apply(&base);
        assert_eq!(updated.slot, slot("14:00", "16:00"));
        assert_eq!(updated.supervisors, vec![TeacherId::new(9)]);
        // Untouched fields survive.
        assert_eq!(updated.classroom, base.classroom);
        assert_eq!(updated.groups, base.groups);
        assert_eq!(updated.date, base.date);
    }

    #[test]
    fn test_draft_into_session() {
        let draft = SessionDraft {
            subject: SubjectId::new(10),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            slot: slot("09:00", "11:00"),
            classroom: ClassroomId::new(100),
            groups: vec![GroupId::new(5)],
            supervisors: vec![TeacherId::new(7)],
            sections: vec![SectionId::new(3)],
            status: StoredStatus::Scheduled,
            exam_type: Some(ExamType::ExamenPrincipal),
        };
        let session = draft.into_session(SessionId::new(42));
        assert_eq!(session.id, SessionId::new(42));
        assert_eq!(session.exam_type, Some(ExamType::ExamenPrincipal));
    }
}
