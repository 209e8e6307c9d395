//! Repository trait definitions.
//!
//! The scheduling engine never talks to a concrete store; everything goes
//! through these traits. Session queries are deliberately narrow (one
//! resource, one date) so conflict validation stays a single bounded query
//! per resource dimension.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{
    Classroom, ClassroomId, ExamRequirement, GroupId, SessionId, StudentGroup, Teacher, TeacherId,
};
use crate::models::{AvailabilityException, RecurringAvailability, Session, SessionDraft};

/// A teacher's supervision load around a date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SupervisorLoad {
    /// Non-cancelled sessions supervised on the date itself.
    pub daily_sessions: usize,
    /// Non-cancelled sessions supervised in the ISO week of the date.
    pub weekly_sessions: usize,
}

/// Repository trait for committed exam sessions.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session, assigning its id.
    async fn insert_session(&self, draft: SessionDraft) -> RepositoryResult<Session>;

    /// Replace a stored session record by id.
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored record after the write
    /// * `Err(RepositoryError::NotFound)` - Unknown id
    async fn update_session(&self, session: Session) -> RepositoryResult<Session>;

    /// Remove a session, freeing its reserved interval.
    ///
    /// # Returns
    /// * `Ok(Session)` - The removed record
    /// * `Err(RepositoryError::NotFound)` - Unknown id
    async fn delete_session(&self, id: SessionId) -> RepositoryResult<Session>;

    /// Fetch a single session by id.
    async fn fetch_session(&self, id: SessionId) -> RepositoryResult<Session>;

    /// List every stored session, in id order.
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>>;

    /// Non-cancelled sessions occupying a classroom on a date.
    async fn active_sessions_for_classroom(
        &self,
        classroom: ClassroomId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>>;

    /// Non-cancelled sessions involving a student group on a date.
    async fn active_sessions_for_group(
        &self,
        group: GroupId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>>;

    /// Non-cancelled sessions a teacher supervises on a date.
    async fn active_sessions_for_supervisor(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>>;

    /// Daily and ISO-week supervision counts for a teacher.
    async fn supervisor_load(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<SupervisorLoad>;
}

/// Repository trait for teacher availability data.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// All recurring weekly windows owned by a teacher.
    async fn recurring_for_teacher(
        &self,
        teacher: TeacherId,
    ) -> RepositoryResult<Vec<RecurringAvailability>>;

    /// Date-specific exceptions owned by a teacher for one date.
    async fn exceptions_for_teacher_on(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<AvailabilityException>>;
}

/// Repository trait for directory lookups and collaborator-supplied data.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// All classrooms, in declaration order.
    async fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>>;

    /// Fetch one classroom by id.
    async fn fetch_classroom(&self, id: ClassroomId) -> RepositoryResult<Classroom>;

    /// All teachers, in declaration order. Declaration order is the
    /// supervisor tie-break order for batch generation.
    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>>;

    /// Fetch one teacher by id.
    async fn fetch_teacher(&self, id: TeacherId) -> RepositoryResult<Teacher>;

    /// All student groups, in declaration order.
    async fn list_groups(&self) -> RepositoryResult<Vec<StudentGroup>>;

    /// The (subject, group-batch) requirements awaiting an exam slot.
    async fn fetch_exam_requirements(&self) -> RepositoryResult<Vec<ExamRequirement>>;

    /// Backend liveness probe for the health endpoint.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Convenience trait combining every repository capability.
pub trait FullRepository:
    SessionRepository + AvailabilityRepository + DirectoryRepository
{
}

impl<T: SessionRepository + AvailabilityRepository + DirectoryRepository> FullRepository for T {}
