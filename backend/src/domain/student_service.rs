use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::attendance_stats::{compute_account_stats, group_by_class, AccountStats, ClassGroup};
use crate::domain::calendar::AttendanceCalendar;
use crate::domain::commands::{
    CreateStudentCommand, MarkAttendanceCommand, StudentListQuery, StudentListResult,
    UpdateStudentCommand,
};
use crate::domain::models::{AccountId, AttendanceStatus, MarkOutcome, Student, StudentDetails};
use crate::error::{AttendanceError, Result};
use crate::storage::StudentStorage;

/// Attempts at a read-modify-write before a concurrent writer wins
const MAX_SAVE_ATTEMPTS: usize = 3;
/// Backoff after the n-th lost save is `n * RETRY_BASE_DELAY` plus up to
/// `RETRY_JITTER_MS` of random jitter
const RETRY_BASE_DELAY: Duration = Duration::from_millis(10);
const RETRY_JITTER_MS: u64 = 10;

/// Service for managing an account's roster and its attendance
#[derive(Clone)]
pub struct StudentService {
    storage: Arc<dyn StudentStorage>,
    calendar: AttendanceCalendar,
}

impl StudentService {
    pub fn new(storage: Arc<dyn StudentStorage>, calendar: AttendanceCalendar) -> Self {
        Self { storage, calendar }
    }

    /// Add a student to the account's roster
    pub async fn create_student(&self, account_id: &AccountId, command: CreateStudentCommand) -> Result<Student> {
        let name = Self::validate_name(command.name.as_deref())?;
        info!("Creating student '{}' for account {}", name, account_id);

        if self.storage.find_student_id_by_name(account_id, &name).await?.is_some() {
            warn!("Student '{}' already exists for account {}", name, account_id);
            return Err(AttendanceError::Conflict("Student already exists".to_string()));
        }

        let details = StudentDetails {
            class_name: Self::clean_optional(command.class_name),
            image: Self::clean_optional(command.image),
            mobile_number: Self::clean_optional(command.mobile_number),
            address: Self::clean_optional(command.address),
        };
        let student = Student::new(account_id.clone(), name, details, Utc::now());

        self.storage.store_student(&student).await?;

        info!("Created student {} with ID: {}", student.name, student.id);
        Ok(student)
    }

    /// List the account's students, newest first, with totals over the listed set
    pub async fn list_students(&self, account_id: &AccountId, query: StudentListQuery) -> Result<StudentListResult> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        info!("Listing students for account {} (search: {:?})", account_id, search);

        let students = self.storage.list_students(account_id, search).await?;
        let total_present = students.iter().map(|s| s.present_count).sum();
        let total_absent = students.iter().map(|s| s.absent_count).sum();

        info!("Found {} students", students.len());
        Ok(StudentListResult {
            students,
            total_present,
            total_absent,
        })
    }

    /// Get one of the account's students
    pub async fn get_student(&self, account_id: &AccountId, student_id: &str) -> Result<Student> {
        match self.storage.get_student(account_id, student_id).await? {
            Some(student) => Ok(student),
            None => {
                warn!("Student not found: {} (account {})", student_id, account_id);
                Err(AttendanceError::student_not_found())
            }
        }
    }

    /// Edit a student's name and optional fields. Attendance is untouched.
    pub async fn update_student(
        &self,
        account_id: &AccountId,
        student_id: &str,
        command: UpdateStudentCommand,
    ) -> Result<Student> {
        info!("Updating student: {}", student_id);

        let new_name = match command.name.as_deref() {
            Some(raw) => Some(Self::validate_name(Some(raw))?),
            None => None,
        };

        if let Some(name) = &new_name {
            if let Some(existing_id) = self.storage.find_student_id_by_name(account_id, name).await? {
                if existing_id != student_id {
                    return Err(AttendanceError::Conflict("Student already exists".to_string()));
                }
            }
        }

        let student = self
            .modify_student(account_id, student_id, |student| {
                if let Some(name) = &new_name {
                    student.name = name.clone();
                }
                let details = &mut student.details;
                Self::apply_edit(&mut details.class_name, &command.class_name);
                Self::apply_edit(&mut details.image, &command.image);
                Self::apply_edit(&mut details.mobile_number, &command.mobile_number);
                Self::apply_edit(&mut details.address, &command.address);
                Ok(())
            })
            .await?;

        info!("Updated student: {} with ID: {}", student.name, student.id);
        Ok(student)
    }

    /// Mark `status` for a day, correcting the entry if that day was already marked
    pub async fn mark_attendance(
        &self,
        account_id: &AccountId,
        student_id: &str,
        command: MarkAttendanceCommand,
    ) -> Result<Student> {
        let (raw_date, raw_status) = match (command.date.as_deref(), command.status.as_deref()) {
            (Some(date), Some(status)) if !date.trim().is_empty() && !status.trim().is_empty() => {
                (date, status)
            }
            _ => return Err(AttendanceError::validation("Date and status are required")),
        };
        let status: AttendanceStatus = raw_status.trim().parse()?;
        let date = self.calendar.parse_attendance_date(raw_date)?;
        let recorded_at = self.calendar.time_of_day(Utc::now());

        info!("Marking {} {} for student {}", date, status, student_id);

        let student = self
            .modify_student(account_id, student_id, |student| {
                match student.mark_attendance(date, status, recorded_at.clone()) {
                    MarkOutcome::Appended => info!("Appended attendance for {}", date),
                    MarkOutcome::Corrected { previous } => {
                        info!("Corrected attendance for {}: {} -> {}", date, previous, status)
                    }
                }
                Ok(())
            })
            .await?;

        debug_assert!(student.counters_consistent());
        Ok(student)
    }

    /// Delete a student with its whole attendance log
    pub async fn delete_student(&self, account_id: &AccountId, student_id: &str) -> Result<Student> {
        info!("Deleting student: {}", student_id);

        match self.storage.delete_student(account_id, student_id).await? {
            Some(student) => {
                info!("Deleted student: {} with ID: {}", student.name, student.id);
                Ok(student)
            }
            None => {
                warn!("Student not found: {} (account {})", student_id, account_id);
                Err(AttendanceError::student_not_found())
            }
        }
    }

    /// Aggregate figures across every student of the account
    pub async fn attendance_stats(&self, account_id: &AccountId) -> Result<AccountStats> {
        let students = self.storage.list_students(account_id, None).await?;
        Ok(compute_account_stats(&students))
    }

    /// The account's students grouped by class label
    pub async fn class_wise_attendance(&self, account_id: &AccountId) -> Result<Vec<ClassGroup>> {
        let students = self.storage.list_students(account_id, None).await?;
        Ok(group_by_class(students))
    }

    /// Read, apply `change`, and save under the optimistic version check,
    /// re-reading when another writer got there first.
    async fn modify_student<F>(&self, account_id: &AccountId, student_id: &str, mut change: F) -> Result<Student>
    where
        F: FnMut(&mut Student) -> Result<()> + Send,
    {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let mut student = self.get_student(account_id, student_id).await?;
            change(&mut student)?;
            student.updated_at = Utc::now();

            if self.storage.save_student(&student).await? {
                student.version += 1;
                return Ok(student);
            }
            warn!(
                "Concurrent update of student {} detected (attempt {}/{})",
                student_id, attempt, MAX_SAVE_ATTEMPTS
            );
            if attempt < MAX_SAVE_ATTEMPTS {
                tokio::time::sleep(Self::retry_delay(attempt)).await;
            }
        }

        Err(AttendanceError::Conflict(
            "Student was modified concurrently, please retry".to_string(),
        ))
    }

    /// Spread competing writers apart so the next read sees the winner's save
    fn retry_delay(attempt: usize) -> Duration {
        let jitter = (uuid::Uuid::new_v4().as_u128() % u128::from(RETRY_JITTER_MS)) as u64;
        RETRY_BASE_DELAY * attempt as u32 + Duration::from_millis(jitter)
    }

    fn validate_name(name: Option<&str>) -> Result<String> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(AttendanceError::validation("Student name is required"));
        }
        Ok(name.to_string())
    }

    fn clean_optional(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn apply_edit(field: &mut Option<String>, edit: &Option<Option<String>>) {
        if let Some(value) = edit {
            *field = Self::clean_optional(value.clone());
        }
    }
}
