//! Read-only statistics: author content analytics, learner and teacher
//! dashboards, and the catalogue showcase lists.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::loaders;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::analytics::{
    CategoryStatsListResponse, CategoryStatsResponse, ContentAnalyticsResponse,
    CourseShowcaseListResponse, CourseShowcaseResponse, InstructorListResponse,
    InstructorStatsResponse, LearnerInstructorListResponse, LearnerInstructorResponse,
    LearnerStatsResponse, TeachingStatsResponse,
};
use crate::services::content_analytics;

const SHOWCASE_LIMIT: i64 = 6;
const TOP_INSTRUCTORS_LIMIT: i64 = 8;

/// Merged into the `/courses` router.
pub(crate) fn course_router() -> Router<AppState> {
    Router::new()
        .route("/popular", get(popular_courses))
        .route("/recent", get(recent_courses))
        .route("/:course_id/content-analytics", get(content_analytics))
}

/// Merged into the `/categories` router.
pub(crate) fn category_router() -> Router<AppState> {
    Router::new().route("/stats", get(categories_with_stats))
}

/// Merged into the `/users` router.
pub(crate) fn user_router() -> Router<AppState> {
    Router::new()
        .route("/top-instructors", get(top_instructors))
        .route("/:user_id/stats", get(learner_stats))
        .route("/:user_id/dashboard-stats", get(teaching_stats))
        .route("/:user_id/instructors", get(learner_instructors))
}

async fn content_analytics(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ContentAnalyticsResponse>, ApiError> {
    let course = loaders::course(&state, &course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let report = content_analytics::course_analytics(state.db(), &course)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to build content analytics"))?;

    tracing::debug!(
        user_id = %user.id,
        course_id = %course_id,
        total_students = report.total_students,
        "Content analytics served"
    );

    Ok(Json(report))
}

async fn popular_courses(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseShowcaseListResponse>, ApiError> {
    let courses = repositories::analytics::popular_courses(state.db(), SHOWCASE_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list popular courses"))?;

    let courses: Vec<CourseShowcaseResponse> =
        courses.into_iter().map(CourseShowcaseResponse::from_db).collect();
    Ok(Json(CourseShowcaseListResponse { total: courses.len(), courses }))
}

async fn recent_courses(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseShowcaseListResponse>, ApiError> {
    let courses = repositories::analytics::recent_courses(state.db(), SHOWCASE_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list recent courses"))?;

    let courses: Vec<CourseShowcaseResponse> =
        courses.into_iter().map(CourseShowcaseResponse::from_db).collect();
    Ok(Json(CourseShowcaseListResponse { total: courses.len(), courses }))
}

async fn categories_with_stats(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CategoryStatsListResponse>, ApiError> {
    let categories = repositories::analytics::categories_with_counts(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list category statistics"))?;

    let categories: Vec<CategoryStatsResponse> =
        categories.into_iter().map(CategoryStatsResponse::from_db).collect();
    Ok(Json(CategoryStatsListResponse { total: categories.len(), categories }))
}

async fn top_instructors(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<InstructorListResponse>, ApiError> {
    let instructors = repositories::analytics::top_instructors(state.db(), TOP_INSTRUCTORS_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructors"))?;

    let instructors: Vec<InstructorStatsResponse> =
        instructors.into_iter().map(InstructorStatsResponse::from_db).collect();
    Ok(Json(InstructorListResponse { total: instructors.len(), instructors }))
}

async fn learner_stats(
    Path(user_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LearnerStatsResponse>, ApiError> {
    authorize(&user, Capability::ReadOwn, Some(&user_id))?;
    require_user(&state, &user_id).await?;

    let stats = repositories::analytics::learner_stats(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load learner statistics"))?;
    Ok(Json(stats.into()))
}

async fn teaching_stats(
    Path(user_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TeachingStatsResponse>, ApiError> {
    authorize(&user, Capability::ReadOwn, Some(&user_id))?;
    require_user(&state, &user_id).await?;

    let stats = repositories::analytics::teaching_stats(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load teaching statistics"))?;
    Ok(Json(stats.into()))
}

async fn learner_instructors(
    Path(user_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LearnerInstructorListResponse>, ApiError> {
    authorize(&user, Capability::ReadOwn, Some(&user_id))?;
    require_user(&state, &user_id).await?;

    let rows = repositories::analytics::learner_instructors(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructors"))?;

    let instructors = LearnerInstructorResponse::group(rows);
    Ok(Json(LearnerInstructorListResponse { total: instructors.len(), instructors }))
}

async fn require_user(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    repositories::users::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests;
