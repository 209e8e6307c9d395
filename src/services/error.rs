//! Scheduling error taxonomy.
//!
//! Conflict and availability failures are expected outcomes of validation,
//! so they are carried as structured values inside [`ScheduleError`] rather
//! than stringified early. The HTTP layer turns them into status codes and
//! response bodies; other callers can match on them directly.

use crate::api::SessionId;
use crate::db::repository::RepositoryError;
use crate::services::availability::SupervisorVerdict;
use crate::services::conflict::ConflictReport;

/// Result type for scheduling operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Error type for session lifecycle and generation operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Missing or malformed request fields. Recoverable by the caller
    /// correcting input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The candidate collides with committed sessions on a classroom or
    /// group. Carries every conflicting resource, not just the first.
    #[error("scheduling conflict: {0}")]
    Conflict(ConflictReport),

    /// One or more named supervisors failed availability resolution.
    #[error("{} supervisor(s) unavailable", .0.len())]
    UnavailableSupervisors(Vec<SupervisorVerdict>),

    /// Unknown session id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session is cancelled; cancellation is terminal.
    #[error("session {0} is cancelled and cannot be modified")]
    CancelledImmutable(SessionId),

    /// Underlying storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScheduleError {
    /// Map a repository fetch error for a known id: not-found becomes the
    /// session-level NotFound, everything else passes through.
    pub fn from_fetch(id: SessionId, err: RepositoryError) -> Self {
        if err.is_not_found() {
            ScheduleError::NotFound(id)
        } else {
            ScheduleError::Repository(err)
        }
    }
}
