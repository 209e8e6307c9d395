//! Session lifecycle orchestration.
//!
//! Create, update and delete run every relevant validation before touching
//! storage, so a failed request leaves no partial state. The
//! validate-then-commit window is serialized per resource through
//! [`ReservationLocks`]: two concurrent writes touching the same
//! `(classroom, date)`, `(group, date)` or `(teacher, date)` cannot both
//! observe "no conflict" and then both commit.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api::{SessionId, TeacherId};
use crate::db::repository::{DirectoryRepository, FullRepository, SessionRepository};
use crate::models::{Session, SessionDraft, SessionPatch, StoredStatus, TimeSlot};
use crate::services::availability::{self, SupervisorVerdict};
use crate::services::conflict::{self, SessionCandidate};
use crate::services::error::{ScheduleError, ScheduleResult};
use crate::services::status::SessionView;

/// One lockable scheduling resource on one date.
///
/// The derived ordering makes lock acquisition deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ResourceKey {
    Classroom(i64, NaiveDate),
    Group(i64, NaiveDate),
    Teacher(i64, NaiveDate),
}

/// Registry of per-resource async mutexes.
///
/// Guards are acquired in sorted key order, so two writers contending for
/// overlapping resource sets cannot deadlock.
#[derive(Default)]
struct ReservationLocks {
    inner: parking_lot::Mutex<HashMap<ResourceKey, Arc<Mutex<()>>>>,
}

impl ReservationLocks {
    async fn acquire(&self, keys: BTreeSet<ResourceKey>) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = {
                let mut map = self.inner.lock();
                Arc::clone(map.entry(key).or_default())
            };
            guards.push(lock.lock_owned().await);
        }
        guards
    }
}

/// Result of an update: the stored record plus the supervisors whose
/// assignments changed (symmetric difference of old and new sets).
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub session: Session,
    pub affected_supervisors: Vec<TeacherId>,
}

/// Orchestrates session mutations over a repository.
pub struct SessionLifecycle {
    repo: Arc<dyn FullRepository>,
    locks: ReservationLocks,
}

impl SessionLifecycle {
    pub fn new(repo: Arc<dyn FullRepository>) -> Self {
        Self {
            repo,
            locks: ReservationLocks::default(),
        }
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    /// Validate and commit a new session.
    ///
    /// Runs the conflict validator and resolves availability for every
    /// named supervisor under the reservation locks; only a fully clean
    /// candidate is persisted.
    pub async fn create(&self, draft: SessionDraft) -> ScheduleResult<Session> {
        if draft.groups.is_empty() {
            return Err(ScheduleError::Validation(
                "a session needs at least one student group".to_string(),
            ));
        }
        if draft.supervisors.is_empty() {
            return Err(ScheduleError::Validation(
                "a session needs at least one supervisor".to_string(),
            ));
        }
        self.repo.fetch_classroom(draft.classroom).await.map_err(|e| {
            if e.is_not_found() {
                ScheduleError::Validation(format!("unknown classroom {}", draft.classroom))
            } else {
                ScheduleError::Repository(e)
            }
        })?;

        // A session created directly in the terminal state reserves nothing.
        if draft.status == StoredStatus::Cancelled {
            let session = self.repo.insert_session(draft).await?;
            return Ok(session);
        }

        let keys = resource_keys(
            draft.date,
            draft.classroom.value(),
            draft.groups.iter().map(|g| g.value()),
            draft.supervisors.iter().map(|t| t.value()),
        );
        let _guards = self.locks.acquire(keys).await;

        let candidate = SessionCandidate {
            classroom: draft.classroom,
            groups: draft.groups.clone(),
            date: draft.date,
            slot: draft.slot,
        };
        let report = conflict::validate(self.repo.as_ref(), &candidate, None).await?;
        if !report.is_clear() {
            debug!("create rejected: {}", report);
            return Err(ScheduleError::Conflict(report));
        }

        self.check_supervisors(&draft.supervisors, draft.date, &draft.slot, None)
            .await?;

        let session = self.repo.insert_session(draft).await?;
        info!(
            "committed session {} on {} {}",
            session.id, session.date, session.slot
        );
        Ok(session)
    }

    /// Apply a partial update to an existing session.
    ///
    /// Only the supervisor delta is re-validated, unless the date or slot
    /// changed, in which case every current supervisor is. Placement
    /// changes always re-run the conflict validator with the session
    /// itself excluded.
    pub async fn update(&self, id: SessionId, patch: SessionPatch) -> ScheduleResult<SessionUpdate> {
        let existing = self
            .repo
            .fetch_session(id)
            .await
            .map_err(|e| ScheduleError::from_fetch(id, e))?;
        if existing.status == StoredStatus::Cancelled {
            return Err(ScheduleError::CancelledImmutable(id));
        }

        let updated = patch.apply(&existing);
        if updated.groups.is_empty() {
            return Err(ScheduleError::Validation(
                "a session needs at least one student group".to_string(),
            ));
        }
        if updated.supervisors.is_empty() {
            return Err(ScheduleError::Validation(
                "a session needs at least one supervisor".to_string(),
            ));
        }

        let added: Vec<TeacherId> = updated
            .supervisors
            .iter()
            .filter(|t| !existing.supervisors.contains(t))
            .copied()
            .collect();
        let removed: Vec<TeacherId> = existing
            .supervisors
            .iter()
            .filter(|t| !updated.supervisors.contains(t))
            .copied()
            .collect();

        if updated.classroom != existing.classroom {
            self.repo.fetch_classroom(updated.classroom).await.map_err(|e| {
                if e.is_not_found() {
                    ScheduleError::Validation(format!("unknown classroom {}", updated.classroom))
                } else {
                    ScheduleError::Repository(e)
                }
            })?;
        }

        let time_changed = updated.date != existing.date || updated.slot != existing.slot;
        let placement_changed = time_changed
            || updated.classroom != existing.classroom
            || updated.groups != existing.groups;

        // Lock the union of old and new resources so both the freed and the
        // newly claimed side of the move are serialized.
        let mut keys = resource_keys(
            existing.date,
            existing.classroom.value(),
            existing.groups.iter().map(|g| g.value()),
            existing.supervisors.iter().map(|t| t.value()),
        );
        keys.extend(resource_keys(
            updated.date,
            updated.classroom.value(),
            updated.groups.iter().map(|g| g.value()),
            updated.supervisors.iter().map(|t| t.value()),
        ));
        let _guards = self.locks.acquire(keys).await;

        // Cancelling releases resources; nothing to validate.
        if updated.status != StoredStatus::Cancelled {
            if placement_changed {
                let candidate = SessionCandidate {
                    classroom: updated.classroom,
                    groups: updated.groups.clone(),
                    date: updated.date,
                    slot: updated.slot,
                };
                let report = conflict::validate(self.repo.as_ref(), &candidate, Some(id)).await?;
                if !report.is_clear() {
                    debug!("update of session {} rejected: {}", id, report);
                    return Err(ScheduleError::Conflict(report));
                }
            }

            let to_validate: &[TeacherId] = if time_changed {
                &updated.supervisors
            } else {
                &added
            };
            self.check_supervisors(to_validate, updated.date, &updated.slot, Some(id))
                .await?;
        }

        let session = self.repo.update_session(updated).await?;

        let mut affected: Vec<TeacherId> = added.into_iter().chain(removed).collect();
        affected.sort();
        affected.dedup();
        Ok(SessionUpdate {
            session,
            affected_supervisors: affected,
        })
    }

    /// Remove a session, freeing its reserved interval.
    ///
    /// Returns the prior supervisor list so callers can notify the people
    /// whose assignments just disappeared.
    pub async fn delete(&self, id: SessionId) -> ScheduleResult<Vec<TeacherId>> {
        let removed = self
            .repo
            .delete_session(id)
            .await
            .map_err(|e| ScheduleError::from_fetch(id, e))?;
        info!("deleted session {} on {}", id, removed.date);
        Ok(removed.supervisors)
    }

    /// Fetch one session with its computed display status.
    pub async fn get(&self, id: SessionId, now: NaiveDateTime) -> ScheduleResult<SessionView> {
        let session = self
            .repo
            .fetch_session(id)
            .await
            .map_err(|e| ScheduleError::from_fetch(id, e))?;
        Ok(SessionView::resolve(&session, now))
    }

    /// List all sessions with computed display status.
    pub async fn list(&self, now: NaiveDateTime) -> ScheduleResult<Vec<SessionView>> {
        let sessions = self.repo.list_sessions().await?;
        Ok(sessions
            .iter()
            .map(|s| SessionView::resolve(s, now))
            .collect())
    }

    /// Resolve availability for each teacher, failing with the complete
    /// list of unavailable supervisors rather than the first.
    async fn check_supervisors(
        &self,
        teachers: &[TeacherId],
        date: NaiveDate,
        slot: &TimeSlot,
        exclude: Option<SessionId>,
    ) -> ScheduleResult<()> {
        let mut verdicts = Vec::new();
        for &teacher in teachers {
            let record = self.repo.fetch_teacher(teacher).await.map_err(|e| {
                if e.is_not_found() {
                    ScheduleError::Validation(format!("unknown teacher {}", teacher))
                } else {
                    ScheduleError::Repository(e)
                }
            })?;
            let availability =
                availability::resolve_teacher(self.repo.as_ref(), teacher, date, slot, exclude)
                    .await?;
            if let Some(reason) = availability.reason {
                verdicts.push(SupervisorVerdict {
                    id: teacher,
                    name: record.name,
                    reason,
                });
            }
        }
        if verdicts.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::UnavailableSupervisors(verdicts))
        }
    }
}

fn resource_keys(
    date: NaiveDate,
    classroom: i64,
    groups: impl Iterator<Item = i64>,
    supervisors: impl Iterator<Item = i64>,
) -> BTreeSet<ResourceKey> {
    let mut keys = BTreeSet::new();
    keys.insert(ResourceKey::Classroom(classroom, date));
    for g in groups {
        keys.insert(ResourceKey::Group(g, date));
    }
    for t in supervisors {
        keys.insert(ResourceKey::Teacher(t, date));
    }
    keys
}
