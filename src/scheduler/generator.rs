//! Greedy earliest-fit schedule generator.
//!
//! For each requirement, candidate `(date, slot)` pairs are walked in
//! chronological order; the first combination with a conflict-free
//! classroom of sufficient capacity and enough available supervisors is
//! committed immediately. Committing as it goes means every later
//! requirement sees the earlier placements as conflict sources, so two
//! requirements from the same run can never collide.
//!
//! Determinism: requirements are ordered by (subject code, group names),
//! classrooms by id, supervisors by directory declaration order. Identical
//! inputs produce identical output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use crate::api::{Classroom, ExamRequirement, GroupId, Teacher, TeacherId};
use crate::db::repository::DirectoryRepository;
use crate::models::{Session, SessionDraft, StoredStatus, TimeSlot};
use crate::services::availability;
use crate::services::conflict::{self, SessionCandidate};
use crate::services::error::{ScheduleError, ScheduleResult};
use crate::services::lifecycle::SessionLifecycle;

/// Inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// The fixed time windows offered on each day of the range.
    pub daily_slots: Vec<TimeSlot>,
    /// Optional wall-clock budget. When exhausted, remaining requirements
    /// are reported unscheduled instead of hanging the run.
    pub deadline: Option<Duration>,
}

/// Why a requirement could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnscheduledReason {
    /// No classroom in the directory seats the batch.
    NoClassroomCapacity,
    /// Every `(date, slot, classroom, supervisors)` combination in range
    /// failed a constraint.
    NoFeasibleSlot,
    /// The run hit its deadline before reaching this requirement.
    DeadlineExceeded,
}

/// A requirement left over after generation, with the failing reason.
#[derive(Debug, Clone, Serialize)]
pub struct UnscheduledRequirement {
    pub requirement: ExamRequirement,
    pub reason: UnscheduledReason,
}

/// The full result of a generation run. Partial results are normal: the
/// caller inspects `unscheduled` to decide whether to retry with a wider
/// range or slot template.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub scheduled: Vec<Session>,
    pub unscheduled: Vec<UnscheduledRequirement>,
}

/// Batch generator over a session lifecycle.
pub struct ScheduleGenerator {
    lifecycle: Arc<SessionLifecycle>,
}

impl ScheduleGenerator {
    pub fn new(lifecycle: Arc<SessionLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Generate sessions for every pending requirement in the date range.
    pub async fn generate(&self, plan: &GenerationPlan) -> ScheduleResult<GenerationOutcome> {
        if plan.start_date > plan.end_date {
            return Err(ScheduleError::Validation(
                "generation start date is after end date".to_string(),
            ));
        }
        if plan.daily_slots.is_empty() {
            return Err(ScheduleError::Validation(
                "generation needs at least one daily slot".to_string(),
            ));
        }

        let repo = self.lifecycle.repository();
        let mut requirements = repo.fetch_exam_requirements().await?;
        let groups = repo.list_groups().await?;
        let group_names: HashMap<GroupId, String> =
            groups.into_iter().map(|g| (g.id, g.name)).collect();

        // Stable ordering key: subject code, then group names. Makes runs
        // reproducible for identical inputs.
        requirements.sort_by_cached_key(|r| {
            let mut names: Vec<&str> = r
                .groups
                .iter()
                .map(|g| group_names.get(g).map(String::as_str).unwrap_or(""))
                .collect();
            names.sort_unstable();
            (r.subject_code.clone(), names.join("+"))
        });

        let mut classrooms = repo.list_classrooms().await?;
        classrooms.sort_by_key(|c| c.id);
        let teachers = repo.list_teachers().await?;

        let started = Instant::now();
        let mut outcome = GenerationOutcome::default();
        for requirement in requirements {
            if let Some(deadline) = plan.deadline {
                if started.elapsed() >= deadline {
                    debug!(
                        "generation deadline hit, {} left unplaced",
                        requirement.subject_code
                    );
                    outcome.unscheduled.push(UnscheduledRequirement {
                        requirement,
                        reason: UnscheduledReason::DeadlineExceeded,
                    });
                    continue;
                }
            }

            match self
                .place(&requirement, plan, &classrooms, &teachers)
                .await?
            {
                Ok(session) => outcome.scheduled.push(session),
                Err(reason) => outcome.unscheduled.push(UnscheduledRequirement {
                    requirement,
                    reason,
                }),
            }
        }

        info!(
            "generation placed {} session(s), {} requirement(s) unscheduled",
            outcome.scheduled.len(),
            outcome.unscheduled.len()
        );
        Ok(outcome)
    }

    /// Find and commit the earliest feasible placement for one requirement.
    async fn place(
        &self,
        requirement: &ExamRequirement,
        plan: &GenerationPlan,
        classrooms: &[Classroom],
        teachers: &[Teacher],
    ) -> ScheduleResult<Result<Session, UnscheduledReason>> {
        let fitting: Vec<&Classroom> = classrooms
            .iter()
            .filter(|c| c.capacity >= requirement.head_count)
            .collect();
        if fitting.is_empty() {
            return Ok(Err(UnscheduledReason::NoClassroomCapacity));
        }

        let repo = self.lifecycle.repository();
        // Every session carries at least one supervisor.
        let needed = requirement.supervisors_needed.max(1);
        let mut date = plan.start_date;
        while date <= plan.end_date {
            for slot in &plan.daily_slots {
                // Supervisors depend only on (date, slot); resolve them once
                // before trying classrooms.
                let supervisors = self.pick_supervisors(teachers, needed, date, slot).await?;
                let Some(supervisors) = supervisors else {
                    continue;
                };

                for classroom in &fitting {
                    let candidate = SessionCandidate {
                        classroom: classroom.id,
                        groups: requirement.groups.clone(),
                        date,
                        slot: *slot,
                    };
                    let report = conflict::validate(repo.as_ref(), &candidate, None).await?;
                    if !report.is_clear() {
                        continue;
                    }

                    let draft = SessionDraft {
                        subject: requirement.subject,
                        date,
                        slot: *slot,
                        classroom: classroom.id,
                        groups: requirement.groups.clone(),
                        supervisors: supervisors.clone(),
                        sections: Vec::new(),
                        status: StoredStatus::Scheduled,
                        exam_type: requirement.exam_type,
                    };
                    // Commit immediately so later requirements in this run
                    // see the placement as a conflict source.
                    match self.lifecycle.create(draft).await {
                        Ok(session) => return Ok(Ok(session)),
                        // Lost the slot between check and commit; keep
                        // searching from the next classroom.
                        Err(ScheduleError::Conflict(_))
                        | Err(ScheduleError::UnavailableSupervisors(_)) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        Ok(Err(UnscheduledReason::NoFeasibleSlot))
    }

    /// First `needed` available teachers in declaration order, or `None`
    /// when the slot cannot be staffed.
    async fn pick_supervisors(
        &self,
        teachers: &[Teacher],
        needed: usize,
        date: NaiveDate,
        slot: &TimeSlot,
    ) -> ScheduleResult<Option<Vec<TeacherId>>> {
        let repo = self.lifecycle.repository();
        let mut picked = Vec::with_capacity(needed);
        for teacher in teachers {
            if picked.len() == needed {
                break;
            }
            let availability =
                availability::resolve_teacher(repo.as_ref(), teacher.id, date, slot, None).await?;
            if availability.available {
                picked.push(teacher.id);
            }
        }
        if picked.len() < needed {
            Ok(None)
        } else {
            Ok(Some(picked))
        }
    }
}
