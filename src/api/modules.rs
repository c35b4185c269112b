use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
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
use crate::schemas::lesson::LessonSummaryResponse;
use crate::schemas::module::{
    ModuleCreate, ModuleResponse, ModuleUpdate, ModuleWithLessonsResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_module))
        .route("/:module_id", get(get_module).patch(update_module).delete(delete_module))
}

async fn create_module(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    validate_payload(&payload)?;
    require_text(&payload.title, "title")?;
    let course = loaders::course(&state, &payload.course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let order_index = match payload.order_index {
        Some(order_index) => order_index,
        None => {
            let existing = repositories::modules::count_for_course(state.db(), &course.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to count modules"))?;
            i32::try_from(existing).unwrap_or(i32::MAX)
        }
    };

    let module = repositories::modules::create(
        state.db(),
        repositories::modules::CreateModule {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            title: payload.title.trim(),
            description: &payload.description,
            order_index,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create module"))?;

    Ok((StatusCode::CREATED, Json(ModuleResponse::from_db(module))))
}

async fn get_module(
    Path(module_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ModuleWithLessonsResponse>, ApiError> {
    let module = loaders::module(&state, &module_id).await?;
    let lessons = repositories::lessons::list_for_module(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lessons"))?;

    Ok(Json(ModuleWithLessonsResponse {
        module: ModuleResponse::from_db(module),
        lessons: lessons.iter().map(LessonSummaryResponse::from_db).collect(),
    }))
}

async fn update_module(
    Path(module_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ModuleUpdate>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module = loaders::module(&state, &module_id).await?;
    let course = loaders::course(&state, &module.course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;
    validate_payload(&payload)?;

    let updated = repositories::modules::update(
        state.db(),
        &module_id,
        repositories::modules::UpdateModule {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            order_index: payload.order_index,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update module"))?
    .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    Ok(Json(ModuleResponse::from_db(updated)))
}

async fn delete_module(
    Path(module_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let module = loaders::module(&state, &module_id).await?;
    let course = loaders::course(&state, &module.course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let lessons = repositories::lessons::count_for_module(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count lessons"))?;
    if lessons > 0 {
        return Err(ApiError::Conflict(format!(
            "Module has {lessons} lesson(s); delete them first"
        )));
    }

    let progress_rows = repositories::progress::count_for_module(state.db(), &module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count module progress"))?;
    if progress_rows > 0 {
        return Err(ApiError::Conflict("Module has recorded student progress".to_string()));
    }

    repositories::modules::delete(state.db(), &module_id).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            ApiError::Conflict("Module still has dependent records".to_string())
        } else {
            ApiError::internal(e, "Failed to delete module")
        }
    })?;

    tracing::info!(
        user_id = %user.id,
        action = "module_delete",
        module_id = %module_id,
        "Module deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
