//! # REST API for Student Management
//!
//! Roster and attendance endpoints, nested under `/api/students` behind
//! `require_account`. Every handler receives the caller's `AccountId` from
//! request extensions and never sees another account's students.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::commands::{
    CreateStudentCommand, MarkAttendanceCommand, StudentListQuery, UpdateStudentCommand,
};
use crate::domain::models::AccountId;
use crate::error::AttendanceError;
use crate::io::error::ApiError;
use crate::io::rest::mappers::StudentMapper;
use crate::AppState;
use shared::{
    ClassWiseResponse, CreateStudentRequest, MarkAttendanceRequest, StatsResponse,
    StudentDetailResponse, StudentListQuery as ListQueryParams, StudentListResponse,
    StudentResponse, UpdateStudentRequest,
};

type ApiResult<T> = Result<T, ApiError>;

/// Create the student API router.
///
/// The static segments are their own routes, so `/stats` and `/class-wise`
/// never reach the `/:student_id` handlers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students))
        .route("/add", post(create_student))
        .route("/stats", get(get_attendance_stats))
        .route("/class-wise", get(get_class_wise_attendance))
        .route(
            "/:student_id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/:student_id/attendance", post(mark_attendance))
}

fn bad_body(rejection: JsonRejection) -> AttendanceError {
    AttendanceError::validation(format!("Invalid request body: {}", rejection.body_text()))
}

/// Add a student to the caller's roster
pub async fn create_student(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    payload: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StudentResponse>)> {
    info!("POST /api/students/add - account {}", account_id);

    let Json(request) = payload.map_err(|e| state.reject(bad_body(e)))?;
    let command = CreateStudentCommand {
        name: request.name,
        class_name: request.class_name,
        image: request.image,
        mobile_number: request.mobile_number,
        address: request.address,
    };

    let student = state
        .student_service
        .create_student(&account_id, command)
        .await
        .map_err(|e| state.reject(e))?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            message: "Student added successfully".to_string(),
            student: StudentMapper::to_dto(student),
        }),
    ))
}

/// List the caller's students, optionally filtered by name
pub async fn list_students(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    params: Result<Query<ListQueryParams>, QueryRejection>,
) -> ApiResult<Json<StudentListResponse>> {
    let Query(params) = params.map_err(|e| {
        state.reject(AttendanceError::validation(format!(
            "Invalid query: {}",
            e.body_text()
        )))
    })?;
    info!("GET /api/students - account {} search {:?}", account_id, params.search);

    let result = state
        .student_service
        .list_students(&account_id, StudentListQuery { search: params.search })
        .await
        .map_err(|e| state.reject(e))?;

    let students = StudentMapper::to_dto_list(result.students);
    Ok(Json(StudentListResponse {
        success: true,
        count: students.len(),
        total_present: result.total_present,
        total_absent: result.total_absent,
        students,
    }))
}

/// Account-wide attendance figures
pub async fn get_attendance_stats(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
) -> ApiResult<Json<StatsResponse>> {
    info!("GET /api/students/stats - account {}", account_id);

    let stats = state
        .student_service
        .attendance_stats(&account_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(StatsResponse {
        success: true,
        stats: StudentMapper::stats_to_dto(stats),
    }))
}

/// Students grouped by class
pub async fn get_class_wise_attendance(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
) -> ApiResult<Json<ClassWiseResponse>> {
    info!("GET /api/students/class-wise - account {}", account_id);

    let groups = state
        .student_service
        .class_wise_attendance(&account_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(ClassWiseResponse {
        success: true,
        data: StudentMapper::class_groups_to_dto(groups),
    }))
}

/// Get a student by ID
pub async fn get_student(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<StudentDetailResponse>> {
    info!("GET /api/students/{}", student_id);

    let student = state
        .student_service
        .get_student(&account_id, &student_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(StudentDetailResponse {
        success: true,
        student: StudentMapper::to_dto(student),
    }))
}

/// Edit a student's name or optional fields
pub async fn update_student(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    Path(student_id): Path<String>,
    payload: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> ApiResult<Json<StudentResponse>> {
    info!("PUT /api/students/{}", student_id);

    let Json(request) = payload.map_err(|e| state.reject(bad_body(e)))?;
    let command = UpdateStudentCommand {
        name: request.name,
        class_name: request.class_name,
        image: request.image,
        mobile_number: request.mobile_number,
        address: request.address,
    };

    let student = state
        .student_service
        .update_student(&account_id, &student_id, command)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(StudentResponse {
        message: "Student updated successfully".to_string(),
        student: StudentMapper::to_dto(student),
    }))
}

/// Mark or correct one day of attendance
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    Path(student_id): Path<String>,
    payload: Result<Json<MarkAttendanceRequest>, JsonRejection>,
) -> ApiResult<Json<StudentResponse>> {
    info!("POST /api/students/{}/attendance", student_id);

    let Json(request) = payload.map_err(|e| state.reject(bad_body(e)))?;
    let command = MarkAttendanceCommand {
        date: request.date,
        status: request.status,
    };

    let student = state
        .student_service
        .mark_attendance(&account_id, &student_id, command)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(StudentResponse {
        message: "Attendance marked successfully".to_string(),
        student: StudentMapper::to_dto(student),
    }))
}

/// Delete a student and its attendance log
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(account_id): Extension<AccountId>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<StudentResponse>> {
    info!("DELETE /api/students/{}", student_id);

    let student = state
        .student_service
        .delete_student(&account_id, &student_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(StudentResponse {
        message: "Student deleted successfully".to_string(),
        student: StudentMapper::to_dto(student),
    }))
}
