//! # Exam Session Scheduling Backend
//!
//! Conflict-resolution and availability-reasoning engine for university
//! exam scheduling.
//!
//! The crate assigns a subject, date, time slot, classroom, student groups
//! and supervising teachers to each exam session so that no resource is
//! double-booked, resolves teacher availability against recurring weekly
//! patterns and date-specific exceptions, derives lifecycle status from the
//! clock, and batch-generates conflict-free schedules for a date range. The
//! engine is exposed as a REST API via Axum.
//!
//! ## Features
//!
//! - **Conflict Validation**: interval-overlap detection across classrooms
//!   and student groups
//! - **Availability Resolution**: recurring patterns, date exceptions and
//!   committed sessions combined with a fixed precedence
//! - **Lifecycle Tracking**: scheduled/ongoing/completed derived from time,
//!   terminal cancellation
//! - **Batch Generation**: greedy earliest-fit assignment over a slot
//!   template, with partial-failure reporting
//! - **HTTP API**: RESTful endpoints for session management
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and shared directory records
//! - [`models`]: Domain model (clock times, slots, sessions, availability)
//! - [`db`]: Repository pattern and storage backends
//! - [`services`]: Conflict, availability, status and lifecycle logic
//! - [`scheduler`]: Batch schedule generation
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod db;
pub mod models;

pub mod scheduler;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
