use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::loaders;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_unique_violation;
use crate::repositories;
use crate::schemas::lesson_test::{
    QuestionWithAnswersResponse, QuestionsListResponse, TestCreate, TestResponse, TestUpdate,
};
use crate::services::course_removal;

pub(super) async fn create_test(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestCreate>,
) -> Result<(StatusCode, Json<TestResponse>), ApiError> {
    validate_payload(&payload)?;
    let placement = loaders::lesson_placement(&state, &payload.lesson_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;

    let test = repositories::lesson_tests::create(
        state.db(),
        repositories::lesson_tests::CreateLessonTest {
            id: &Uuid::new_v4().to_string(),
            lesson_id: &payload.lesson_id,
            max_attempts: payload.max_attempts,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Lesson already has a test".to_string())
        } else {
            ApiError::internal(e, "Failed to create test")
        }
    })?;

    Ok((StatusCode::CREATED, Json(TestResponse::from_db(test, 0))))
}

pub(super) async fn get_test(
    Path(test_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TestResponse>, ApiError> {
    let (test, _placement) = loaders::lesson_test(&state, &test_id).await?;
    let questions = repositories::questions::count_for_test(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(TestResponse::from_db(test, questions)))
}

pub(super) async fn update_test(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestUpdate>,
) -> Result<Json<TestResponse>, ApiError> {
    let (_test, placement) = loaders::lesson_test(&state, &test_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;
    validate_payload(&payload)?;

    let updated =
        repositories::lesson_tests::update_max_attempts(state.db(), &test_id, payload.max_attempts)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update test"))?
            .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;
    let questions = repositories::questions::count_for_test(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(TestResponse::from_db(updated, questions)))
}

pub(super) async fn delete_test(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let (_test, placement) = loaders::lesson_test(&state, &test_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;

    let report = course_removal::remove_test(state.db(), &test_id).await?;

    tracing::info!(
        user_id = %user.id,
        action = "test_delete",
        test_id = %test_id,
        attempts = report.rows_for("test_attempts"),
        rows = report.total_rows(),
        "Test removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Students see answer options only; the course creator and admins also see `correct`.
pub(super) async fn list_questions(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionsListResponse>, ApiError> {
    let (_test, placement) = loaders::lesson_test(&state, &test_id).await?;
    let reveal_correct =
        authorize(&user, Capability::WriteOwn, Some(&placement.creator_id)).is_ok();

    let questions = repositories::questions::list_for_test(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let answers = repositories::questions::list_answers_for_test(state.db(), &test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    let questions = QuestionWithAnswersResponse::group(questions, answers, reveal_correct);
    Ok(Json(QuestionsListResponse { test_id, total: questions.len(), questions }))
}
