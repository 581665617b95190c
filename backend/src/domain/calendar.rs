//! Calendar-day handling for attendance records.
//!
//! Attendance is keyed by calendar day, never by instant. Incoming dates are
//! normalised to a `NaiveDate` in the configured offset before any comparison,
//! so two marks that land on the same local day always hit the same record.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::error::{AttendanceError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// True when both dates name the same calendar day
pub fn is_same_calendar_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

/// Converts between wire dates and calendar days in one fixed offset
#[derive(Debug, Clone, Copy)]
pub struct AttendanceCalendar {
    offset: FixedOffset,
}

impl AttendanceCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse `YYYY-MM-DD` as-is, or an RFC 3339 timestamp converted into this
    /// calendar's offset before the day is taken.
    pub fn parse_attendance_date(&self, raw: &str) -> Result<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|instant| instant.with_timezone(&self.offset).date_naive())
            .map_err(|_| {
                AttendanceError::validation(format!(
                    "Invalid date '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
                    raw
                ))
            })
    }

    /// Time of day in this calendar's offset, as stored on attendance records
    pub fn time_of_day(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset)
            .format(TIME_OF_DAY_FORMAT)
            .to_string()
    }
}

/// Storage and API representation of a calendar day
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// DD/MM/YYYY, used by the class-wise view
pub fn format_date_for_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> AttendanceCalendar {
        AttendanceCalendar::new(FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn test_plain_date_is_taken_verbatim() {
        let date = utc().parse_attendance_date("2024-01-10").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

        let date = utc().parse_attendance_date("  2024-02-29 ").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_timestamps_are_normalised_to_calendar_offset() {
        let new_york = AttendanceCalendar::new(FixedOffset::west_opt(5 * 3600).unwrap());
        let tokyo = AttendanceCalendar::new(FixedOffset::east_opt(9 * 3600).unwrap());
        let instant = "2024-01-10T23:30:00-05:00";

        assert_eq!(
            new_york.parse_attendance_date(instant).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert_eq!(
            tokyo.parse_attendance_date(instant).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
    }

    #[test]
    fn test_same_day_ignores_time_of_submission() {
        let calendar = utc();
        let morning = calendar.parse_attendance_date("2024-01-10T08:00:00Z").unwrap();
        let evening = calendar.parse_attendance_date("2024-01-10T21:45:10Z").unwrap();
        let plain = calendar.parse_attendance_date("2024-01-10").unwrap();

        assert!(is_same_calendar_day(morning, evening));
        assert!(is_same_calendar_day(morning, plain));
        assert!(!is_same_calendar_day(
            plain,
            calendar.parse_attendance_date("2024-01-11").unwrap()
        ));
    }

    #[test]
    fn test_invalid_dates_are_validation_errors() {
        for raw in ["", "yesterday", "2024-13-01", "2023-02-29", "10/01/2024"] {
            assert!(
                matches!(utc().parse_attendance_date(raw), Err(AttendanceError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_formatting() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "2024-01-05");
        assert_eq!(format_date_for_display(date), "05/01/2024");
        assert_eq!(parse_stored_date("2024-01-05"), Some(date));
        assert_eq!(parse_stored_date("05/01/2024"), None);
    }

    #[test]
    fn test_time_of_day_uses_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 22, 15, 30).unwrap();
        assert_eq!(utc().time_of_day(now), "22:15:30");

        let kolkata = AttendanceCalendar::new(FixedOffset::east_opt(330 * 60).unwrap());
        assert_eq!(kolkata.time_of_day(now), "03:45:30");
    }
}
