//! Batch schedule generation.
//!
//! Turns the pending exam requirements into committed sessions across a
//! date range, using the conflict validator and the availability resolver
//! for every placement. Generation is greedy earliest-fit and deterministic;
//! it never revisits an earlier placement.

pub mod generator;

pub use generator::{
    GenerationOutcome, GenerationPlan, ScheduleGenerator, UnscheduledReason,
    UnscheduledRequirement,
};
