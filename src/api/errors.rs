use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::attempts::AttemptError;
use crate::services::course_removal::RemovalError;
use crate::services::progress::ProgressError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response = (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                let status = StatusCode::FORBIDDEN;
                (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response()
            }
            ApiError::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(error: ProgressError) -> Self {
        match error {
            ProgressError::LessonNotFound
            | ProgressError::ModuleNotFound
            | ProgressError::NotEnrolled => ApiError::NotFound(error.to_string()),
            ProgressError::Database(err) => ApiError::internal(err, "Failed to update progress"),
        }
    }
}

impl From<AttemptError> for ApiError {
    fn from(error: AttemptError) -> Self {
        match error {
            AttemptError::TestNotFound
            | AttemptError::AttemptNotFound
            | AttemptError::QuestionNotFound
            | AttemptError::AnswerNotFound => ApiError::NotFound(error.to_string()),
            AttemptError::MaxAttemptsReached => ApiError::Forbidden("Maximum attempts reached"),
            AttemptError::NotOwner => ApiError::Forbidden("Attempt belongs to another user"),
            AttemptError::AlreadyCompleted
            | AttemptError::AnswerMismatch
            | AttemptError::QuestionMismatch => ApiError::BadRequest(error.to_string()),
            AttemptError::Database(err) => ApiError::internal(err, "Failed to process test attempt"),
        }
    }
}

impl From<RemovalError> for ApiError {
    fn from(error: RemovalError) -> Self {
        match error {
            RemovalError::CourseNotFound | RemovalError::TestNotFound => {
                ApiError::NotFound(error.to_string())
            }
            RemovalError::HasDependents(_) => ApiError::Conflict(error.to_string()),
            RemovalError::Database(err) => ApiError::internal(err, "Failed to remove records"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    use super::ApiError;
    use crate::services::attempts::AttemptError;
    use crate::services::course_removal::RemovalError;
    use crate::services::progress::ProgressError;

    fn status_of(error: impl Into<ApiError>) -> StatusCode {
        error.into().into_response().status()
    }

    #[test]
    fn attempt_errors_map_to_http_statuses() {
        assert_eq!(status_of(AttemptError::TestNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AttemptError::MaxAttemptsReached), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AttemptError::NotOwner), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AttemptError::AlreadyCompleted), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AttemptError::AnswerNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AttemptError::AnswerMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AttemptError::QuestionMismatch), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn progress_and_removal_errors_map_to_http_statuses() {
        assert_eq!(status_of(ProgressError::NotEnrolled), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ProgressError::LessonNotFound), StatusCode::NOT_FOUND);
        let dependents = crate::repositories::removal::CourseDependents {
            attempts: 1,
            ..Default::default()
        };
        assert_eq!(status_of(RemovalError::HasDependents(dependents)), StatusCode::CONFLICT);
        assert_eq!(status_of(RemovalError::CourseNotFound), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unauthorized_carries_bearer_challenge_and_json_body() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["status"], 401);
        assert_eq!(json["detail"], "Invalid authentication credentials");
    }
}
