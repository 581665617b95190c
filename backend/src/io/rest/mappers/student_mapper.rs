use chrono::SecondsFormat;

use crate::domain::attendance_stats::{AccountStats, ClassGroup};
use crate::domain::calendar::{format_date, format_date_for_display};
use crate::domain::models::{
    AttendanceRecord as DomainRecord, AttendanceStatus as DomainStatus, Student as DomainStudent,
};
use shared::{
    AttendanceRecord as SharedRecord, AttendanceStats, AttendanceStatus as SharedStatus,
    ClassAttendance, ClassStudent, FormattedAttendanceRecord, Student as SharedStudent,
};

/// Mapper from domain students and aggregates to the shared wire DTOs.
pub struct StudentMapper;

impl StudentMapper {
    pub fn to_dto(domain: DomainStudent) -> SharedStudent {
        SharedStudent {
            id: domain.id,
            name: domain.name,
            class_name: domain.details.class_name,
            image: domain.details.image,
            mobile_number: domain.details.mobile_number,
            address: domain.details.address,
            present: domain.present_count,
            absent: domain.absent_count,
            history: domain.attendance_log.into_iter().map(Self::record_to_dto).collect(),
            created_at: domain.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: domain.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_dto_list(students: Vec<DomainStudent>) -> Vec<SharedStudent> {
        students.into_iter().map(Self::to_dto).collect()
    }

    pub fn status_to_dto(status: DomainStatus) -> SharedStatus {
        match status {
            DomainStatus::Present => SharedStatus::Present,
            DomainStatus::Absent => SharedStatus::Absent,
        }
    }

    fn record_to_dto(record: DomainRecord) -> SharedRecord {
        SharedRecord {
            date: format_date(record.date),
            status: Self::status_to_dto(record.status),
            time: record.recorded_at,
        }
    }

    pub fn stats_to_dto(stats: AccountStats) -> AttendanceStats {
        AttendanceStats {
            total_students: stats.total_students,
            total_present: stats.total_present,
            total_absent: stats.total_absent,
            total_records: stats.total_records,
            average_attendance: stats.average_attendance,
        }
    }

    /// Class groups for the class-wise view, with DD/MM/YYYY dates
    pub fn class_groups_to_dto(groups: Vec<ClassGroup>) -> Vec<ClassAttendance> {
        groups
            .into_iter()
            .map(|group| ClassAttendance {
                class: group.label,
                total_present: group.total_present,
                total_absent: group.total_absent,
                students: group.students.into_iter().map(Self::class_student_to_dto).collect(),
            })
            .collect()
    }

    fn class_student_to_dto(student: DomainStudent) -> ClassStudent {
        ClassStudent {
            student_id: student.id,
            student_name: student.name,
            student_image: student.details.image,
            mobile_number: student.details.mobile_number,
            address: student.details.address,
            present: student.present_count,
            absent: student.absent_count,
            attendance_records: student
                .attendance_log
                .into_iter()
                .map(|record| FormattedAttendanceRecord {
                    date: format_date_for_display(record.date),
                    status: Self::status_to_dto(record.status),
                    time: record.recorded_at,
                })
                .collect(),
        }
    }
}
