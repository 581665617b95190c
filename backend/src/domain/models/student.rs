//! Domain model for a student and the attendance log embedded in it.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use super::account::AccountId;
use crate::domain::calendar::is_same_calendar_day;
use crate::error::AttendanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(AttendanceError::validation("Status must be present or absent")),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar-day entry. Has no identity outside its student.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// HH:MM:SS, display only
    pub recorded_at: String,
}

/// Free-text fields besides the name, all optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentDetails {
    pub class_name: Option<String>,
    pub image: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// What `Student::mark_attendance` did to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Appended,
    Corrected { previous: AttendanceStatus },
}

/// Domain model representing a student on an account's roster.
///
/// `present_count + absent_count` always equals `attendance_log.len()`, and
/// the log holds at most one record per calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: String,
    pub account_id: AccountId,
    pub name: String,
    pub details: StudentDetails,
    pub present_count: u32,
    pub absent_count: u32,
    pub attendance_log: Vec<AttendanceRecord>,
    /// Optimistic concurrency token; bumped by storage on every save
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Generate a unique ID for a student
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// A fresh student with an empty log
    pub fn new(account_id: AccountId, name: String, details: StudentDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(),
            account_id,
            name,
            details,
            present_count: 0,
            absent_count: 0,
            attendance_log: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record `status` for `date`, correcting an existing entry for the same day.
    ///
    /// The counter of the replaced status is released before the new one is
    /// taken, so a correction to the same status leaves both counters as they
    /// were and only refreshes `recorded_at`.
    pub fn mark_attendance(
        &mut self,
        date: NaiveDate,
        status: AttendanceStatus,
        recorded_at: String,
    ) -> MarkOutcome {
        let existing = self
            .attendance_log
            .iter()
            .position(|record| is_same_calendar_day(record.date, date));

        let outcome = match existing {
            Some(index) => {
                let previous = self.attendance_log[index].status;
                self.release(previous);
                let record = &mut self.attendance_log[index];
                record.status = status;
                record.recorded_at = recorded_at;
                MarkOutcome::Corrected { previous }
            }
            None => {
                self.attendance_log.push(AttendanceRecord {
                    date,
                    status,
                    recorded_at,
                });
                MarkOutcome::Appended
            }
        };

        match status {
            AttendanceStatus::Present => self.present_count += 1,
            AttendanceStatus::Absent => self.absent_count += 1,
        }

        outcome
    }

    fn release(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present_count = self.present_count.saturating_sub(1),
            AttendanceStatus::Absent => self.absent_count = self.absent_count.saturating_sub(1),
        }
    }

    pub fn total_records(&self) -> usize {
        self.attendance_log.len()
    }

    /// Whether the counters agree with the log
    pub fn counters_consistent(&self) -> bool {
        let present = self
            .attendance_log
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        let absent = self.attendance_log.len() - present;
        present == self.present_count as usize && absent == self.absent_count as usize
    }

    pub fn class_name(&self) -> Option<&str> {
        self.details.class_name.as_deref()
    }
}
