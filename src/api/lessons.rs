use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::loaders;
use crate::api::validation::{require_text, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_foreign_key_violation;
use crate::repositories;
use crate::schemas::lesson::{
    LessonCreate, LessonDetailResponse, LessonProgressResponse, LessonResponse, LessonUpdate,
};
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_lesson))
        .route("/:lesson_id", get(get_lesson).patch(update_lesson).delete(delete_lesson))
        .route("/:lesson_id/progress", put(mark_finished))
}

async fn create_lesson(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    validate_payload(&payload)?;
    require_text(&payload.title, "title")?;
    let module = loaders::module(&state, &payload.module_id).await?;
    let course = loaders::course(&state, &module.course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let order_index = match payload.order_index {
        Some(order_index) => order_index,
        None => {
            let existing = repositories::lessons::count_for_module(state.db(), &module.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to count lessons"))?;
            i32::try_from(existing).unwrap_or(i32::MAX)
        }
    };

    let lesson = repositories::lessons::create(
        state.db(),
        repositories::lessons::CreateLesson {
            id: &Uuid::new_v4().to_string(),
            module_id: &module.id,
            title: payload.title.trim(),
            content: &payload.content,
            order_index,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson))))
}

async fn get_lesson(
    Path(lesson_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LessonDetailResponse>, ApiError> {
    let placement = loaders::lesson_placement(&state, &lesson_id).await?;
    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    let test = repositories::lesson_tests::find_by_lesson(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson test"))?;

    Ok(Json(LessonDetailResponse {
        lesson: LessonResponse::from_db(lesson),
        course_id: placement.course_id,
        test_id: test.map(|test| test.id),
    }))
}

async fn update_lesson(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<LessonUpdate>,
) -> Result<Json<LessonResponse>, ApiError> {
    let placement = loaders::lesson_placement(&state, &lesson_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;
    validate_payload(&payload)?;

    let updated = repositories::lessons::update(
        state.db(),
        &lesson_id,
        repositories::lessons::UpdateLesson {
            title: payload.title.map(|title| title.trim().to_string()),
            content: payload.content,
            order_index: payload.order_index,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update lesson"))?
    .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(LessonResponse::from_db(updated)))
}

async fn delete_lesson(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let placement = loaders::lesson_placement(&state, &lesson_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&placement.creator_id))?;

    let progress_rows = repositories::progress::count_for_lesson(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count lesson progress"))?;
    if progress_rows > 0 {
        return Err(ApiError::Conflict("Lesson has recorded student progress".to_string()));
    }

    let test = repositories::lesson_tests::find_by_lesson(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson test"))?;
    if test.is_some() {
        return Err(ApiError::Conflict("Lesson has a test; delete it first".to_string()));
    }

    repositories::lessons::delete(state.db(), &lesson_id).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            ApiError::Conflict("Lesson still has dependent records".to_string())
        } else {
            ApiError::internal(e, "Failed to delete lesson")
        }
    })?;

    tracing::info!(
        user_id = %user.id,
        action = "lesson_delete",
        lesson_id = %lesson_id,
        module_id = %placement.module_id,
        "Lesson deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_finished(
    Path(lesson_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LessonProgressResponse>, ApiError> {
    let outcome = progress::mark_lesson_finished(state.db(), &user.id, &lesson_id).await?;

    Ok(Json(LessonProgressResponse {
        success: true,
        module_finished: outcome.module_finished,
        course_finished: outcome.course_finished,
    }))
}
