use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::loaders;
use crate::api::validation::{require_text, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::lesson_test::{AnswerCreate, AnswerResponse, QuestionCreate, QuestionResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_question))
}

pub(crate) fn answers_router() -> Router<AppState> {
    Router::new().route("/", post(create_answer))
}

async fn create_question(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    validate_payload(&payload)?;
    require_text(&payload.text, "text")?;
    let (test, placement) = loaders::lesson_test(&state, &payload.test_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            test_id: &test.id,
            text: payload.text.trim(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn create_answer(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    validate_payload(&payload)?;
    require_text(&payload.text, "text")?;

    let question = repositories::questions::find_by_id(state.db(), &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;
    let (_test, placement) = loaders::lesson_test(&state, &question.test_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;

    let answer = repositories::questions::create_answer(
        state.db(),
        repositories::questions::CreateAnswer {
            id: &Uuid::new_v4().to_string(),
            question_id: &question.id,
            text: payload.text.trim(),
            correct: payload.correct,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}
