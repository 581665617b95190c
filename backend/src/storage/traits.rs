//! # Storage Traits
//!
//! Storage abstraction used by the domain layer, so the roster can live in
//! any backend that honours these contracts.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{AccountId, Student};

/// Persistence for students and their embedded attendance logs.
///
/// Every lookup is scoped by account: a student stored under another account
/// behaves exactly as if it did not exist.
#[async_trait]
pub trait StudentStorage: Send + Sync {
    /// Insert a new student together with its log
    async fn store_student(&self, student: &Student) -> Result<()>;

    /// Retrieve one student of an account
    async fn get_student(&self, account_id: &AccountId, student_id: &str) -> Result<Option<Student>>;

    /// Id of the account's student whose name equals `name` ignoring case
    async fn find_student_id_by_name(&self, account_id: &AccountId, name: &str) -> Result<Option<String>>;

    /// List an account's students, newest first, read from one snapshot.
    /// `name_filter` keeps names containing it, ignoring case.
    async fn list_students(&self, account_id: &AccountId, name_filter: Option<&str>) -> Result<Vec<Student>>;

    /// Overwrite a stored student, fields, counters and log together.
    ///
    /// Only succeeds while the stored version still equals `student.version`;
    /// the stored version is then incremented. Returns `false` when the
    /// student is missing or was changed by someone else in the meantime.
    async fn save_student(&self, student: &Student) -> Result<bool>;

    /// Delete a student and its log, returning what was removed
    async fn delete_student(&self, account_id: &AccountId, student_id: &str) -> Result<Option<Student>>;
}
