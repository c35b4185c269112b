use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::course::CourseResponse;
use crate::schemas::user::{
    EnrolledCourseResponse, MyCoursesResponse, UserResponse, WishlistResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/courses", get(my_courses))
        .route("/me/wishlist", get(my_wishlist))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn my_courses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MyCoursesResponse>, ApiError> {
    let courses = repositories::courses::list_enrolled(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled courses"))?;

    let courses: Vec<EnrolledCourseResponse> =
        courses.into_iter().map(EnrolledCourseResponse::from_db).collect();
    Ok(Json(MyCoursesResponse { total: courses.len(), courses }))
}

async fn my_wishlist(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<WishlistResponse>, ApiError> {
    let courses = repositories::wishlist::list_courses(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list wishlist"))?;

    let courses: Vec<CourseResponse> = courses.into_iter().map(CourseResponse::from_db).collect();
    Ok(Json(WishlistResponse { total: courses.len(), courses }))
}

#[cfg(test)]
mod tests;
