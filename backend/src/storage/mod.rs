//! # Storage Module
//!
//! Persistence for the roster. The domain layer only sees the
//! `StudentStorage` trait; `StudentRepository` implements it on SQLite
//! through sqlx, storing each student as one row plus one row per
//! attendance record.

pub mod connection;
pub mod student_repository;
pub mod traits;

pub use connection::DbConnection;
pub use student_repository::StudentRepository;
pub use traits::StudentStorage;
