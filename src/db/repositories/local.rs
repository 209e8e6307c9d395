//! In-memory repository implementation.
//!
//! Backs the default development and test configuration. All state lives in
//! a single `RwLock`-guarded store; the async trait methods take the lock
//! only for the duration of the query, so concurrent reads do not contend.
//!
//! Directory data (classrooms, teachers, groups, availability patterns,
//! exam requirements) is seeded through the `seed_*` methods, standing in
//! for the external systems that own those records in production.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use parking_lot::RwLock;

use crate::api::{
    Classroom, ClassroomId, ExamRequirement, GroupId, SessionId, StudentGroup, Teacher, TeacherId,
};
use crate::db::repository::{
    AvailabilityRepository, DirectoryRepository, ErrorContext, RepositoryError, RepositoryResult,
    SessionRepository, SupervisorLoad,
};
use crate::models::{AvailabilityException, RecurringAvailability, Session, SessionDraft};

#[derive(Default)]
struct Store {
    next_session_id: i64,
    sessions: HashMap<SessionId, Session>,
    classrooms: Vec<Classroom>,
    teachers: Vec<Teacher>,
    groups: Vec<StudentGroup>,
    recurring: Vec<RecurringAvailability>,
    exceptions: Vec<AvailabilityException>,
    requirements: Vec<ExamRequirement>,
}

/// In-memory repository.
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                next_session_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Register a classroom in the directory.
    pub fn seed_classroom(&self, classroom: Classroom) {
        self.store.write().classrooms.push(classroom);
    }

    /// Register a teacher in the directory.
    pub fn seed_teacher(&self, teacher: Teacher) {
        self.store.write().teachers.push(teacher);
    }

    /// Register a student group in the directory.
    pub fn seed_group(&self, group: StudentGroup) {
        self.store.write().groups.push(group);
    }

    /// Attach a recurring weekly window to a teacher.
    pub fn seed_recurring(&self, window: RecurringAvailability) {
        self.store.write().recurring.push(window);
    }

    /// Attach a date-specific exception to a teacher.
    pub fn seed_exception(&self, exception: AvailabilityException) {
        self.store.write().exceptions.push(exception);
    }

    /// Queue an exam requirement for batch generation.
    pub fn seed_requirement(&self, requirement: ExamRequirement) {
        self.store.write().requirements.push(requirement);
    }

    fn not_found(id: SessionId) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("session {} not found", id),
            ErrorContext::new("fetch_session")
                .with_entity("session")
                .with_entity_id(id),
        )
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn insert_session(&self, draft: SessionDraft) -> RepositoryResult<Session> {
        let mut store = self.store.write();
        let id = SessionId::new(store.next_session_id);
        store.next_session_id += 1;
        let session = draft.into_session(id);
        store.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn update_session(&self, session: Session) -> RepositoryResult<Session> {
        let mut store = self.store.write();
        if !store.sessions.contains_key(&session.id) {
            return Err(Self::not_found(session.id).with_operation("update_session"));
        }
        store.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<Session> {
        let mut store = self.store.write();
        store
            .sessions
            .remove(&id)
            .ok_or_else(|| Self::not_found(id).with_operation("delete_session"))
    }

    async fn fetch_session(&self, id: SessionId) -> RepositoryResult<Session> {
        let store = self.store.read();
        store
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>> {
        let store = self.store.read();
        let mut sessions: Vec<Session> = store.sessions.values().cloned().collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn active_sessions_for_classroom(
        &self,
        classroom: ClassroomId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>> {
        let store = self.store.read();
        let mut sessions: Vec<Session> = store
            .sessions
            .values()
            .filter(|s| s.is_active() && s.date == date && s.classroom == classroom)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn active_sessions_for_group(
        &self,
        group: GroupId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>> {
        let store = self.store.read();
        let mut sessions: Vec<Session> = store
            .sessions
            .values()
            .filter(|s| s.is_active() && s.date == date && s.involves_group(group))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn active_sessions_for_supervisor(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Session>> {
        let store = self.store.read();
        let mut sessions: Vec<Session> = store
            .sessions
            .values()
            .filter(|s| s.is_active() && s.date == date && s.supervised_by(teacher))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.id);
        Ok(sessions)
    }

    async fn supervisor_load(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<SupervisorLoad> {
        let store = self.store.read();
        let week = date.iso_week();
        let mut load = SupervisorLoad::default();
        for session in store.sessions.values() {
            if !session.is_active() || !session.supervised_by(teacher) {
                continue;
            }
            if session.date == date {
                load.daily_sessions += 1;
            }
            if session.date.iso_week() == week {
                load.weekly_sessions += 1;
            }
        }
        Ok(load)
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn recurring_for_teacher(
        &self,
        teacher: TeacherId,
    ) -> RepositoryResult<Vec<RecurringAvailability>> {
        let store = self.store.read();
        Ok(store
            .recurring
            .iter()
            .filter(|w| w.teacher == teacher)
            .cloned()
            .collect())
    }

    async fn exceptions_for_teacher_on(
        &self,
        teacher: TeacherId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<AvailabilityException>> {
        let store = self.store.read();
        Ok(store
            .exceptions
            .iter()
            .filter(|e| e.teacher == teacher && e.date == date)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DirectoryRepository for LocalRepository {
    async fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>> {
        Ok(self.store.read().classrooms.clone())
    }

    async fn fetch_classroom(&self, id: ClassroomId) -> RepositoryResult<Classroom> {
        let store = self.store.read();
        store
            .classrooms
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("classroom {} not found", id),
                    ErrorContext::new("fetch_classroom")
                        .with_entity("classroom")
                        .with_entity_id(id),
                )
            })
    }

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        Ok(self.store.read().teachers.clone())
    }

    async fn fetch_teacher(&self, id: TeacherId) -> RepositoryResult<Teacher> {
        let store = self.store.read();
        store
            .teachers
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("teacher {} not found", id),
                    ErrorContext::new("fetch_teacher")
                        .with_entity("teacher")
                        .with_entity_id(id),
                )
            })
    }

    async fn list_groups(&self) -> RepositoryResult<Vec<StudentGroup>> {
        Ok(self.store.read().groups.clone())
    }

    async fn fetch_exam_requirements(&self) -> RepositoryResult<Vec<ExamRequirement>> {
        Ok(self.store.read().requirements.clone())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockTime, StoredStatus, TimeSlot};
    use crate::api::{SectionId, SubjectId};

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(start.parse::<ClockTime>().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn draft(date: NaiveDate, s: TimeSlot) -> SessionDraft {
        SessionDraft {
            subject: SubjectId::new(1),
            date,
            slot: s,
            classroom: ClassroomId::new(1),
            groups: vec![GroupId::new(1)],
            supervisors: vec![TeacherId::new(1)],
            sections: vec![SectionId::new(1)],
            status: StoredStatus::Scheduled,
            exam_type: None,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let a = repo
            .insert_session(draft(date(1), slot("09:00", "11:00")))
            .await
            .unwrap();
        let b = repo
            .insert_session(draft(date(1), slot("13:00", "15:00")))
            .await
            .unwrap();
        assert_eq!(a.id, SessionId::new(1));
        assert_eq!(b.id, SessionId::new(2));
    }

    #[tokio::test]
    async fn test_fetch_unknown_session_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.fetch_session(SessionId::new(99)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_classroom_query_skips_cancelled_and_other_dates() {
        let repo = LocalRepository::new();
        let kept = repo
            .insert_session(draft(date(1), slot("09:00", "11:00")))
            .await
            .unwrap();
        let mut cancelled = repo
            .insert_session(draft(date(1), slot("11:00", "12:00")))
            .await
            .unwrap();
        cancelled.status = StoredStatus::Cancelled;
        repo.update_session(cancelled).await.unwrap();
        repo.insert_session(draft(date(2), slot("09:00", "11:00")))
            .await
            .unwrap();

        let found = repo
            .active_sessions_for_classroom(ClassroomId::new(1), date(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_supervisor_load_counts_day_and_iso_week() {
        let repo = LocalRepository::new();
        // 2024-05-06 is a Monday; 05-08 is in the same ISO week, 05-13 is not.
        repo.insert_session(draft(date(6), slot("09:00", "11:00")))
            .await
            .unwrap();
        repo.insert_session(draft(date(8), slot("09:00", "11:00")))
            .await
            .unwrap();
        repo.insert_session(draft(date(13), slot("09:00", "11:00")))
            .await
            .unwrap();

        let load = repo
            .supervisor_load(TeacherId::new(1), date(6))
            .await
            .unwrap();
        assert_eq!(load.daily_sessions, 1);
        assert_eq!(load.weekly_sessions, 2);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let repo = LocalRepository::new();
        let created = repo
            .insert_session(draft(date(1), slot("09:00", "11:00")))
            .await
            .unwrap();
        let removed = repo.delete_session(created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(repo.fetch_session(created.id).await.is_err());
    }
}
