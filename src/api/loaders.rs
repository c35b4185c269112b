//! Lookups shared by handlers that turn a missing row into a 404.

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Course, LessonPlacement, LessonTest, Module};
use crate::repositories;

pub(crate) async fn course(state: &AppState, course_id: &str) -> Result<Course, ApiError> {
    repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}

pub(crate) async fn module(state: &AppState, module_id: &str) -> Result<Module, ApiError> {
    repositories::modules::find_by_id(state.db(), module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))
}

/// Lesson placement with the owning course resolved.
pub(crate) struct PlacedLesson {
    pub(crate) module_id: String,
    pub(crate) course_id: String,
    pub(crate) creator_id: String,
}

pub(crate) async fn lesson_placement(
    state: &AppState,
    lesson_id: &str,
) -> Result<PlacedLesson, ApiError> {
    let placement: LessonPlacement =
        repositories::lessons::find_placement(state.db(), lesson_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
            .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    match (placement.course_id, placement.creator_id) {
        (Some(course_id), Some(creator_id)) => {
            Ok(PlacedLesson { module_id: placement.module_id, course_id, creator_id })
        }
        _ => Err(ApiError::NotFound("Module not found".to_string())),
    }
}

/// Test together with the placement of its lesson.
pub(crate) async fn lesson_test(
    state: &AppState,
    test_id: &str,
) -> Result<(LessonTest, PlacedLesson), ApiError> {
    let test = repositories::lesson_tests::find_by_id(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;
    let placement = lesson_placement(state, &test.lesson_id).await?;
    Ok((test, placement))
}
