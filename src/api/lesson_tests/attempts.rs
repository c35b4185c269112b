use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::loaders;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::lesson_test::{
    AttemptListResponse, AttemptResponse, CompleteAttemptResponse, StartAttemptResponse,
    SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::services::attempts;

pub(super) async fn start_attempt(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<StartAttemptResponse>), ApiError> {
    let started = attempts::start(state.db(), &user.id, &test_id).await?;
    Ok((StatusCode::CREATED, Json(StartAttemptResponse::from_started(started))))
}

pub(super) async fn submit_answer(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    validate_payload(&payload)?;

    let correct = attempts::submit_answer(
        state.db(),
        &user.id,
        &attempt_id,
        &payload.question_id,
        &payload.selected_answer_id,
    )
    .await?;

    Ok(Json(SubmitAnswerResponse { success: true, correct }))
}

pub(super) async fn complete_attempt(
    Path(attempt_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CompleteAttemptResponse>, ApiError> {
    let result = attempts::complete(state.db(), &user.id, &attempt_id).await?;
    Ok(Json(CompleteAttemptResponse::from_score(result)))
}

/// The caller's own attempts on a test, newest first.
pub(super) async fn list_attempts(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AttemptListResponse>, ApiError> {
    let (test, _placement) = loaders::lesson_test(&state, &test_id).await?;

    let attempts = repositories::attempts::list_for_user(state.db(), &test_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let attempts: Vec<AttemptResponse> =
        attempts.into_iter().map(AttemptResponse::from_db).collect();
    Ok(Json(AttemptListResponse {
        test_id,
        total_attempts: attempts.len(),
        max_attempts: test.max_attempts,
        attempts,
    }))
}
