pub mod account;
pub mod student;

pub use account::AccountId;
pub use student::{AttendanceRecord, AttendanceStatus, MarkOutcome, Student, StudentDetails};
