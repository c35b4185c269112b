use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::validation::{require_text, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_unique_violation;
use crate::repositories;
use crate::schemas::category::{
    CategoryCreate, CategoryListResponse, CategoryResponse, CategoryUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:category_id", put(update_category).delete(delete_category))
}

async fn list_categories(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = repositories::categories::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;

    let categories: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from_db).collect();
    Ok(Json(CategoryListResponse { total: categories.len(), categories }))
}

async fn create_category(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    authorize(&user, Capability::AdminOverride, None)?;
    validate_payload(&payload)?;
    require_text(&payload.name, "name")?;

    let category = repositories::categories::create(
        state.db(),
        repositories::categories::CreateCategory {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            description: payload.description.as_deref(),
            image: payload.image.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Category with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create category")
        }
    })?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from_db(category))))
}

async fn update_category(
    Path(category_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    authorize(&user, Capability::AdminOverride, None)?;
    validate_payload(&payload)?;
    if let Some(name) = payload.name.as_deref() {
        require_text(name, "name")?;
    }

    let updated = repositories::categories::update(
        state.db(),
        &category_id,
        repositories::categories::UpdateCategory {
            name: payload.name.map(|name| name.trim().to_string()),
            description: payload.description,
            image: payload.image,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Category with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to update category")
        }
    })?
    .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(CategoryResponse::from_db(updated)))
}

async fn delete_category(
    Path(category_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    authorize(&user, Capability::AdminOverride, None)?;

    repositories::categories::find_by_id(state.db(), &category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let courses = repositories::categories::count_courses(state.db(), &category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count category courses"))?;
    if courses > 0 {
        return Err(ApiError::Conflict(format!(
            "Category is used by {courses} course(s) and cannot be deleted"
        )));
    }

    repositories::categories::delete(state.db(), &category_id).await.map_err(|e| {
        if crate::db::is_foreign_key_violation(&e) {
            ApiError::Conflict("Category is used by courses and cannot be deleted".to_string())
        } else {
            ApiError::internal(e, "Failed to delete category")
        }
    })?;

    tracing::info!(
        admin_id = %user.id,
        action = "category_delete",
        category_id = %category_id,
        "Admin action"
    );

    Ok(StatusCode::NO_CONTENT)
}
