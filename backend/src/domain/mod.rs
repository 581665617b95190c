//! # Domain Module
//!
//! Business rules for the attendance tracker: the student model with its
//! day-keyed attendance log, calendar normalisation, aggregate figures, and
//! `StudentService`, which orchestrates them over a `StudentStorage`.
//!
//! Every operation takes the caller's `AccountId`; a student belonging to
//! another account is indistinguishable from one that does not exist.

pub mod attendance_stats;
pub mod calendar;
pub mod commands;
pub mod models;
pub mod student_service;

pub use attendance_stats::{AccountStats, ClassGroup};
pub use calendar::AttendanceCalendar;
pub use student_service::StudentService;
