use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::error;

use crate::error::AttendanceError;

/// A domain failure on its way out as an HTTP response.
///
/// Internal failures are logged here and answered with a generic message;
/// the underlying chain is attached only when `include_detail` is set.
#[derive(Debug)]
pub struct ApiError {
    source: AttendanceError,
    include_detail: bool,
}

impl ApiError {
    pub fn new(source: AttendanceError, include_detail: bool) -> Self {
        Self {
            source,
            include_detail,
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.source {
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Conflict(_) => StatusCode::CONFLICT,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AttendanceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.source {
            AttendanceError::Internal(e) => {
                error!("Request failed: {:#}", e);
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    error: self.include_detail.then(|| format!("{:#}", e)),
                }
            }
            AttendanceError::Validation(message)
            | AttendanceError::Conflict(message)
            | AttendanceError::NotFound(message)
            | AttendanceError::Unauthorized(message) => ErrorResponse {
                message,
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_statuses_follow_error_kind() {
        let cases = [
            (AttendanceError::validation("bad"), StatusCode::BAD_REQUEST),
            (AttendanceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AttendanceError::student_not_found(), StatusCode::NOT_FOUND),
            (AttendanceError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
        ];
        for (source, expected) in cases {
            let message = source.to_string();
            let (status, body) = body_of(ApiError::new(source, true)).await;
            assert_eq!(status, expected);
            assert_eq!(body.message, message);
            assert_eq!(body.error, None);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_only_when_enabled() {
        let hidden = ApiError::new(anyhow::anyhow!("disk on fire").into(), false);
        let (status, body) = body_of(hidden).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.error, None);

        let shown = ApiError::new(anyhow::anyhow!("disk on fire").into(), true);
        let (_, body) = body_of(shown).await;
        assert_eq!(body.error.as_deref(), Some("disk on fire"));
    }
}
