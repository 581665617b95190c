//! Derived attendance figures.
//!
//! Everything here is a pure function of a slice of students already scoped
//! to one account; nothing is cached or persisted.

use std::collections::BTreeMap;

use super::models::Student;

/// Label of the group holding students without a class
pub const UNASSIGNED_CLASS: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq)]
pub struct AccountStats {
    pub total_students: usize,
    pub total_present: u32,
    pub total_absent: u32,
    pub total_records: usize,
    pub average_attendance: f64,
}

/// Students sharing one class label, with their combined counters
#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup {
    pub label: String,
    pub students: Vec<Student>,
    pub total_present: u32,
    pub total_absent: u32,
}

/// Sum counters and records across all of an account's students
pub fn compute_account_stats(students: &[Student]) -> AccountStats {
    let total_present: u32 = students.iter().map(|s| s.present_count).sum();
    let total_absent: u32 = students.iter().map(|s| s.absent_count).sum();
    let total_records: usize = students.iter().map(Student::total_records).sum();

    AccountStats {
        total_students: students.len(),
        total_present,
        total_absent,
        total_records,
        average_attendance: attendance_percentage(total_present, total_records),
    }
}

/// Present share of all records as a percentage, rounded to 2 decimals.
/// Returns 0 when there is nothing to divide by.
pub fn attendance_percentage(present: u32, records: usize) -> f64 {
    if records == 0 {
        return 0.0;
    }
    let pct = f64::from(present) / records as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Partition students by class label.
///
/// Blank or missing classes share the `Unassigned` group, which sorts last;
/// the remaining groups are ordered by label. Students keep their input order
/// within a group.
pub fn group_by_class(students: Vec<Student>) -> Vec<ClassGroup> {
    let mut labelled: BTreeMap<String, ClassGroup> = BTreeMap::new();
    let mut unassigned: Option<ClassGroup> = None;

    for student in students {
        let group = match student.class_name().map(str::trim).filter(|c| !c.is_empty()) {
            Some(label) => labelled
                .entry(label.to_string())
                .or_insert_with(|| ClassGroup::empty(label)),
            None => unassigned.get_or_insert_with(|| ClassGroup::empty(UNASSIGNED_CLASS)),
        };
        group.total_present += student.present_count;
        group.total_absent += student.absent_count;
        group.students.push(student);
    }

    labelled.into_values().chain(unassigned).collect()
}

impl ClassGroup {
    fn empty(label: &str) -> Self {
        Self {
            label: label.to_string(),
            students: Vec::new(),
            total_present: 0,
            total_absent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AccountId, AttendanceStatus, StudentDetails};
    use chrono::{NaiveDate, Utc};

    fn student(name: &str, class: Option<&str>, marks: &[(u32, AttendanceStatus)]) -> Student {
        let mut student = Student::new(
            AccountId::parse("acct").unwrap(),
            name.to_string(),
            StudentDetails {
                class_name: class.map(str::to_string),
                ..StudentDetails::default()
            },
            Utc::now(),
        );
        for (day, status) in marks {
            let date = NaiveDate::from_ymd_opt(2024, 1, *day).unwrap();
            student.mark_attendance(date, *status, "09:00:00".to_string());
        }
        student
    }

    #[test]
    fn test_stats_for_empty_roster() {
        let stats = compute_account_stats(&[]);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.average_attendance, 0.0);
    }

    #[test]
    fn test_stats_sum_counters_and_round_average() {
        use AttendanceStatus::*;
        let students = vec![
            student("A", None, &[(1, Present), (2, Present), (3, Absent)]),
            student("B", None, &[]),
            student("C", None, &[(1, Present), (2, Absent), (3, Absent)]),
        ];

        let stats = compute_account_stats(&students);
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.total_present, 3);
        assert_eq!(stats.total_absent, 3);
        assert_eq!(stats.total_records, 6);
        assert_eq!(stats.average_attendance, 50.0);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(attendance_percentage(1, 3), 33.33);
        assert_eq!(attendance_percentage(2, 3), 66.67);
        assert_eq!(attendance_percentage(3, 3), 100.0);
        assert_eq!(attendance_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_grouping_sizes_and_sums() {
        use AttendanceStatus::*;
        let students = vec![
            student("Ann", Some("Class 1"), &[(1, Present), (2, Absent)]),
            student("Ben", Some("Class 2"), &[(1, Absent)]),
            student("Cat", Some("Class 1"), &[(1, Present)]),
        ];

        let groups = group_by_class(students);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].label, "Class 1");
        assert_eq!(groups[0].students.len(), 2);
        assert_eq!(groups[0].total_present, 2);
        assert_eq!(groups[0].total_absent, 1);
        let names: Vec<&str> = groups[0].students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cat"]);

        assert_eq!(groups[1].label, "Class 2");
        assert_eq!(groups[1].students.len(), 1);
        assert_eq!(groups[1].total_present, 0);
        assert_eq!(groups[1].total_absent, 1);
    }

    #[test]
    fn test_unassigned_group_sorts_last() {
        let students = vec![
            student("NoClass", None, &[]),
            student("Blank", Some("   "), &[]),
            student("Zed", Some("Z-Class"), &[]),
            student("Al", Some("A-Class"), &[]),
        ];

        let groups = group_by_class(students);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["A-Class", "Z-Class", UNASSIGNED_CLASS]);
        assert_eq!(groups[2].students.len(), 2);
    }

    #[test]
    fn test_grouping_empty_roster() {
        assert!(group_by_class(Vec::new()).is_empty());
    }
}
