//! Public API surface for the scheduling backend.
//!
//! This file consolidates the identifier newtypes and the directory record
//! types shared between the repository layer, the scheduling services and
//! the HTTP API. All types derive Serialize/Deserialize for JSON
//! serialization.

use serde::{Deserialize, Serialize};

use crate::models::ExamType;

/// Defines a newtype identifier over `i64` with the conversions and
/// formatting every entity id needs.
macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Exam session identifier (storage primary key).
    SessionId
);
entity_id!(
    /// Subject identifier.
    SubjectId
);
entity_id!(
    /// Classroom identifier.
    ClassroomId
);
entity_id!(
    /// Teacher identifier.
    TeacherId
);
entity_id!(
    /// Student group identifier.
    GroupId
);
entity_id!(
    /// Section identifier.
    SectionId
);

/// Classroom directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    /// Seating capacity used for batch assignment.
    pub capacity: u32,
}

/// Teacher directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

/// Student group directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentGroup {
    pub id: GroupId,
    pub name: String,
    /// Number of enrolled students.
    pub size: u32,
}

/// Subject directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    /// Stable subject code, also the primary ordering key for generation.
    pub code: String,
    pub name: String,
}

/// One (subject, group-batch) unit that still needs an exam slot.
///
/// Requirement enumeration itself is a collaborator concern; the repository
/// hands the generator a flat list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRequirement {
    pub subject: SubjectId,
    /// Denormalized subject code, kept here so ordering does not need a
    /// directory round-trip per requirement.
    pub subject_code: String,
    pub groups: Vec<GroupId>,
    /// Total students sitting the exam; bounds classroom choice.
    pub head_count: u32,
    /// How many supervising teachers the session needs.
    pub supervisors_needed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<ExamType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_value_roundtrip() {
        let id = SessionId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(SessionId::from(42), id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ClassroomId::new(7).to_string(), "7");
        assert_eq!(TeacherId::new(-1).to_string(), "-1");
    }

    #[test]
    fn test_id_ordering() {
        let mut ids = vec![ClassroomId::new(3), ClassroomId::new(1), ClassroomId::new(2)];
        ids.sort();
        assert_eq!(
            ids,
            vec![ClassroomId::new(1), ClassroomId::new(2), ClassroomId::new(3)]
        );
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&GroupId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: GroupId = serde_json::from_str("12").unwrap();
        assert_eq!(back, GroupId::new(12));
    }
}
