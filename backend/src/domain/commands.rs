//! Domain-level command and query types.
//!
//! These are what `StudentService` accepts. The REST layer maps the public
//! DTOs from the `shared` crate into them; raw text is kept where the service
//! owns the validation rules.

use super::models::Student;

/// Input for adding a student to the roster.
#[derive(Debug, Clone, Default)]
pub struct CreateStudentCommand {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub image: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// Field edits. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateStudentCommand {
    pub name: Option<String>,
    pub class_name: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub mobile_number: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

/// Input for marking or correcting one day of attendance.
#[derive(Debug, Clone, Default)]
pub struct MarkAttendanceCommand {
    pub date: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub search: Option<String>,
}

/// Result of listing students. Totals cover exactly the returned students.
#[derive(Debug, Clone)]
pub struct StudentListResult {
    pub students: Vec<Student>,
    pub total_present: u32,
    pub total_absent: u32,
}
