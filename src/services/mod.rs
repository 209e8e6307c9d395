//! Service layer: the conflict-resolution and availability engine.
//!
//! This module holds the scheduling logic proper, between the repository
//! layer and the transport layer:
//!
//! - [`conflict`]: interval-overlap detection across classrooms and groups
//! - [`availability`]: teacher/classroom availability resolution
//! - [`status`]: time-derived lifecycle phases (pure)
//! - [`lifecycle`]: create/update/delete orchestration with per-resource
//!   write serialization
//! - [`error`]: the scheduling error taxonomy

pub mod availability;
pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod status;

pub use availability::{
    classroom_availability, resolve_teacher, teacher_availability_overview, Availability,
    ClassroomAvailability, SupervisorVerdict, TeacherAvailability, UnavailableReason,
};
pub use conflict::{validate, ConflictReport, SessionCandidate};
pub use error::{ScheduleError, ScheduleResult};
pub use lifecycle::{SessionLifecycle, SessionUpdate};
pub use status::{display_phase, SessionView};
