use serde::{Deserialize, Deserializer, Serialize};

/// Attendance status as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One calendar-day entry in a student's attendance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub status: AttendanceStatus,
    /// Wall-clock time the entry was last written (HH:MM:SS)
    pub time: String,
}

/// Student as returned by every endpoint that returns a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    /// URL of an externally hosted photo
    pub image: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    /// Number of days marked present
    pub present: u32,
    /// Number of days marked absent
    pub absent: u32,
    /// Attendance entries in the order they were first recorded
    pub history: Vec<AttendanceRecord>,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

/// Body of POST /api/students/add
///
/// Every field is optional at the serde level so that a missing name is
/// reported as a validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of PUT /api/students/:id
///
/// For the optional fields, an absent key leaves the value untouched while an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        rename = "class",
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub class_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
}

/// Distinguishes a present-but-null key from a missing one.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Body of POST /api/students/:id/attendance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(default)]
    pub date: Option<String>,
    /// `present` or `absent`; kept as text so bad values get a readable 400
    #[serde(default)]
    pub status: Option<String>,
}

/// Query string of GET /api/students
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentListQuery {
    pub search: Option<String>,
}

/// Response for create, update, attendance marking and delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub message: String,
    pub student: Student,
}

/// Response for GET /api/students/:id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDetailResponse {
    pub success: bool,
    pub student: Student,
}

/// Response for GET /api/students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListResponse {
    pub success: bool,
    pub count: usize,
    /// Sum of `present` over the returned students
    pub total_present: u32,
    /// Sum of `absent` over the returned students
    pub total_absent: u32,
    pub students: Vec<Student>,
}

/// Account-wide attendance figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_students: usize,
    pub total_present: u32,
    pub total_absent: u32,
    pub total_records: usize,
    /// Percentage rounded to two decimals, 0 when nothing has been recorded
    pub average_attendance: f64,
}

/// Response for GET /api/students/stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: AttendanceStats,
}

/// Attendance entry formatted for the class-wise view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedAttendanceRecord {
    /// DD/MM/YYYY
    pub date: String,
    pub status: AttendanceStatus,
    pub time: String,
}

/// A student inside a class group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStudent {
    pub student_id: String,
    pub student_name: String,
    pub student_image: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    pub present: u32,
    pub absent: u32,
    pub attendance_records: Vec<FormattedAttendanceRecord>,
}

/// Students sharing one class label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendance {
    pub class: String,
    pub total_present: u32,
    pub total_absent: u32,
    pub students: Vec<ClassStudent>,
}

/// Response for GET /api/students/class-wise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWiseResponse {
    pub success: bool,
    pub data: Vec<ClassAttendance>,
}

/// Response for GET /api/health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Internal error detail, only populated in development
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_uses_wire_field_names() {
        let student = Student {
            id: "abc".to_string(),
            name: "Alice".to_string(),
            class_name: Some("Class 1".to_string()),
            image: None,
            mobile_number: Some("555-0100".to_string()),
            address: None,
            present: 1,
            absent: 0,
            history: vec![AttendanceRecord {
                date: "2024-01-10".to_string(),
                status: AttendanceStatus::Present,
                time: "09:15:00".to_string(),
            }],
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-10T09:15:00+00:00".to_string(),
        };

        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["class"], "Class 1");
        assert_eq!(json["mobileNumber"], "555-0100");
        assert_eq!(json["history"][0]["status"], "present");
        assert!(json.get("class_name").is_none());
    }

    #[test]
    fn test_update_request_distinguishes_null_from_missing() {
        let request: UpdateStudentRequest =
            serde_json::from_str(r#"{"class": null, "address": "12 High St"}"#).unwrap();

        assert_eq!(request.name, None);
        assert_eq!(request.class_name, Some(None));
        assert_eq!(request.address, Some(Some("12 High St".to_string())));
        assert_eq!(request.image, None);
        assert_eq!(request.mobile_number, None);
    }

    #[test]
    fn test_create_request_tolerates_missing_name() {
        let request: CreateStudentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, CreateStudentRequest::default());
    }

    #[test]
    fn test_error_response_omits_empty_detail() {
        let body = ErrorResponse {
            message: "Student not found".to_string(),
            error: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"Student not found"}"#);
    }
}
