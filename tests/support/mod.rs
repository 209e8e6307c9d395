//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, Weekday};

use examsched::api::{
    Classroom, ClassroomId, ExamRequirement, GroupId, SectionId, StudentGroup, SubjectId, Teacher,
    TeacherId,
};
use examsched::db::repositories::LocalRepository;
use examsched::models::{
    ClockTime, RecurringAvailability, SessionDraft, StoredStatus, TimeSlot,
};

pub fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::new(
        start.parse::<ClockTime>().expect("start literal"),
        end.parse::<ClockTime>().expect("end literal"),
    )
    .expect("slot literal")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date literal")
}

/// A repository with two classrooms, three teachers and two groups.
///
/// Teachers are available every weekday 08:00-18:00 so tests that do not
/// exercise the pattern logic are unconstrained by it.
pub fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();

    repo.seed_classroom(Classroom {
        id: ClassroomId::new(1),
        name: "A101".to_string(),
        capacity: 30,
    });
    repo.seed_classroom(Classroom {
        id: ClassroomId::new(2),
        name: "A102".to_string(),
        capacity: 60,
    });

    for (id, name) in [(1, "Amel Haddad"), (2, "Karim Bouzid"), (3, "Lina Mansour")] {
        repo.seed_teacher(Teacher {
            id: TeacherId::new(id),
            name: name.to_string(),
        });
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            repo.seed_recurring(RecurringAvailability {
                teacher: TeacherId::new(id),
                weekday,
                slot: slot("08:00", "18:00"),
            });
        }
    }

    repo.seed_group(StudentGroup {
        id: GroupId::new(1),
        name: "GL2-A".to_string(),
        size: 28,
    });
    repo.seed_group(StudentGroup {
        id: GroupId::new(2),
        name: "GL2-B".to_string(),
        size: 25,
    });

    repo
}

pub fn draft(
    classroom: i64,
    groups: &[i64],
    supervisors: &[i64],
    on: NaiveDate,
    s: TimeSlot,
) -> SessionDraft {
    SessionDraft {
        subject: SubjectId::new(1),
        date: on,
        slot: s,
        classroom: ClassroomId::new(classroom),
        groups: groups.iter().copied().map(GroupId::new).collect(),
        supervisors: supervisors.iter().copied().map(TeacherId::new).collect(),
        sections: vec![SectionId::new(1)],
        status: StoredStatus::Scheduled,
        exam_type: None,
    }
}

pub fn requirement(
    subject: i64,
    code: &str,
    groups: &[i64],
    head_count: u32,
    supervisors_needed: usize,
) -> ExamRequirement {
    ExamRequirement {
        subject: SubjectId::new(subject),
        subject_code: code.to_string(),
        groups: groups.iter().copied().map(GroupId::new).collect(),
        head_count,
        supervisors_needed,
        exam_type: None,
    }
}
