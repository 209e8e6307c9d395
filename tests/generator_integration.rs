//! Integration tests for batch schedule generation.

mod support;

use std::sync::Arc;
use std::time::Duration;

use examsched::api::{Classroom, ClassroomId, StudentGroup, GroupId, Teacher, TeacherId};
use examsched::db::repositories::LocalRepository;
use examsched::db::repository::FullRepository;
use examsched::models::RecurringAvailability;
use examsched::scheduler::{
    GenerationPlan, ScheduleGenerator, UnscheduledReason,
};
use examsched::services::lifecycle::SessionLifecycle;
use chrono::Weekday;

use support::{date, requirement, seeded_repo, slot};

fn generator_over(repo: Arc<LocalRepository>) -> ScheduleGenerator {
    let lifecycle = Arc::new(SessionLifecycle::new(repo as Arc<dyn FullRepository>));
    ScheduleGenerator::new(lifecycle)
}

fn two_day_plan() -> GenerationPlan {
    GenerationPlan {
        // 2024-06-03 and 04 are Monday and Tuesday, inside the seeded
        // weekday availability.
        start_date: date(2024, 6, 3),
        end_date: date(2024, 6, 4),
        daily_slots: vec![slot("09:00", "11:00"), slot("13:00", "15:00")],
        deadline: None,
    }
}

#[tokio::test]
async fn generation_places_requirements_in_distinct_slots() {
    // Two requirements that both fit only classroom A102 (capacity 60) must
    // land in different slots, never the same one.
    let repo = Arc::new(seeded_repo());
    repo.seed_requirement(requirement(1, "CS101", &[1], 50, 1));
    repo.seed_requirement(requirement(2, "CS102", &[2], 50, 1));
    let generator = generator_over(Arc::clone(&repo));

    let outcome = generator.generate(&two_day_plan()).await.unwrap();
    assert_eq!(outcome.scheduled.len(), 2);
    assert!(outcome.unscheduled.is_empty());

    let a = &outcome.scheduled[0];
    let b = &outcome.scheduled[1];
    assert_eq!(a.classroom, ClassroomId::new(2));
    assert_eq!(b.classroom, ClassroomId::new(2));
    assert!(
        a.date != b.date || !a.slot.overlaps(&b.slot),
        "same classroom placed twice into {} {} and {} {}",
        a.date,
        a.slot,
        b.date,
        b.slot
    );
}

#[tokio::test]
async fn generation_prefers_earliest_slot_and_lowest_classroom() {
    let repo = Arc::new(seeded_repo());
    repo.seed_requirement(requirement(1, "CS101", &[1], 20, 1));
    let generator = generator_over(Arc::clone(&repo));

    let outcome = generator.generate(&two_day_plan()).await.unwrap();
    let placed = &outcome.scheduled[0];
    assert_eq!(placed.date, date(2024, 6, 3));
    assert_eq!(placed.slot, slot("09:00", "11:00"));
    // Both classrooms fit 20 students; the lower id wins.
    assert_eq!(placed.classroom, ClassroomId::new(1));
    // Earliest-declared teacher wins.
    assert_eq!(placed.supervisors, vec![TeacherId::new(1)]);
}

#[tokio::test]
async fn generation_is_deterministic() {
    let build = || {
        let repo = Arc::new(seeded_repo());
        repo.seed_requirement(requirement(3, "MATH2", &[2], 20, 1));
        repo.seed_requirement(requirement(1, "CS101", &[1], 20, 2));
        repo.seed_requirement(requirement(2, "CS102", &[1], 50, 1));
        repo
    };

    let first = generator_over(build());
    let second = generator_over(build());
    let plan = two_day_plan();

    let a = first.generate(&plan).await.unwrap();
    let b = second.generate(&plan).await.unwrap();

    assert_eq!(a.scheduled.len(), b.scheduled.len());
    for (x, y) in a.scheduled.iter().zip(&b.scheduled) {
        assert_eq!(x.subject, y.subject);
        assert_eq!(x.date, y.date);
        assert_eq!(x.slot, y.slot);
        assert_eq!(x.classroom, y.classroom);
        assert_eq!(x.supervisors, y.supervisors);
    }
}

#[tokio::test]
async fn generation_respects_preexisting_sessions() {
    let repo = Arc::new(seeded_repo());
    let lifecycle = Arc::new(SessionLifecycle::new(
        Arc::clone(&repo) as Arc<dyn FullRepository>
    ));
    // Monday morning in A101 is already taken.
    lifecycle
        .create(support::draft(
            1,
            &[2],
            &[3],
            date(2024, 6, 3),
            slot("09:00", "11:00"),
        ))
        .await
        .unwrap();

    repo.seed_requirement(requirement(1, "CS101", &[1], 20, 1));
    let generator = ScheduleGenerator::new(Arc::clone(&lifecycle));
    let outcome = generator.generate(&two_day_plan()).await.unwrap();

    let placed = &outcome.scheduled[0];
    // A101 is busy, so the first free fitting classroom is A102.
    assert_eq!(placed.date, date(2024, 6, 3));
    assert_eq!(placed.slot, slot("09:00", "11:00"));
    assert_eq!(placed.classroom, ClassroomId::new(2));
}

#[tokio::test]
async fn oversized_batch_is_reported_not_fatal() {
    let repo = Arc::new(seeded_repo());
    repo.seed_requirement(requirement(1, "CS101", &[1], 500, 1));
    repo.seed_requirement(requirement(2, "CS102", &[2], 20, 1));
    let generator = generator_over(Arc::clone(&repo));

    let outcome = generator.generate(&two_day_plan()).await.unwrap();
    // The feasible requirement still lands.
    assert_eq!(outcome.scheduled.len(), 1);
    assert_eq!(outcome.unscheduled.len(), 1);
    assert_eq!(
        outcome.unscheduled[0].reason,
        UnscheduledReason::NoClassroomCapacity
    );
    assert_eq!(outcome.unscheduled[0].requirement.subject_code, "CS101");
}

#[tokio::test]
async fn saturated_range_leaves_requirements_unscheduled() {
    // One classroom, one slot, one teacher: only one of two same-group
    // requirements can be placed.
    let repo = Arc::new(LocalRepository::new());
    repo.seed_classroom(Classroom {
        id: ClassroomId::new(1),
        name: "B201".to_string(),
        capacity: 40,
    });
    repo.seed_teacher(Teacher {
        id: TeacherId::new(1),
        name: "Sole Proctor".to_string(),
    });
    repo.seed_recurring(RecurringAvailability {
        teacher: TeacherId::new(1),
        weekday: Weekday::Mon,
        slot: slot("08:00", "18:00"),
    });
    repo.seed_group(StudentGroup {
        id: GroupId::new(1),
        name: "G1".to_string(),
        size: 30,
    });
    repo.seed_requirement(requirement(1, "CS101", &[1], 30, 1));
    repo.seed_requirement(requirement(2, "CS102", &[1], 30, 1));

    let generator = generator_over(Arc::clone(&repo));
    let plan = GenerationPlan {
        start_date: date(2024, 6, 3),
        end_date: date(2024, 6, 3),
        daily_slots: vec![slot("09:00", "11:00")],
        deadline: None,
    };

    let outcome = generator.generate(&plan).await.unwrap();
    assert_eq!(outcome.scheduled.len(), 1);
    assert_eq!(outcome.unscheduled.len(), 1);
    assert_eq!(
        outcome.unscheduled[0].reason,
        UnscheduledReason::NoFeasibleSlot
    );
}

#[tokio::test]
async fn exhausted_deadline_returns_partial_result() {
    let repo = Arc::new(seeded_repo());
    repo.seed_requirement(requirement(1, "CS101", &[1], 20, 1));
    repo.seed_requirement(requirement(2, "CS102", &[2], 20, 1));
    let generator = generator_over(Arc::clone(&repo));

    let mut plan = two_day_plan();
    plan.deadline = Some(Duration::ZERO);

    let outcome = generator.generate(&plan).await.unwrap();
    assert!(outcome.scheduled.is_empty());
    assert_eq!(outcome.unscheduled.len(), 2);
    assert!(outcome
        .unscheduled
        .iter()
        .all(|u| u.reason == UnscheduledReason::DeadlineExceeded));
}

#[tokio::test]
async fn invalid_plan_is_rejected() {
    let repo = Arc::new(seeded_repo());
    let generator = generator_over(repo);

    let backwards = GenerationPlan {
        start_date: date(2024, 6, 4),
        end_date: date(2024, 6, 3),
        daily_slots: vec![slot("09:00", "11:00")],
        deadline: None,
    };
    assert!(generator.generate(&backwards).await.is_err());

    let empty_template = GenerationPlan {
        start_date: date(2024, 6, 3),
        end_date: date(2024, 6, 4),
        daily_slots: vec![],
        deadline: None,
    };
    assert!(generator.generate(&empty_template).await.is_err());
}
