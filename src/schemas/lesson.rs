use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Lesson;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonCreate {
    #[validate(length(min = 1, message = "moduleId must not be empty"))]
    pub(crate) module_id: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "orderIndex must be non-negative"))]
    pub(crate) order_index: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "orderIndex must be non-negative"))]
    pub(crate) order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: String,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            content: lesson.content,
            order_index: lesson.order_index,
            created_at: format_primitive(lesson.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonDetailResponse {
    #[serde(flatten)]
    pub(crate) lesson: LessonResponse,
    pub(crate) course_id: String,
    pub(crate) test_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
}

impl LessonSummaryResponse {
    pub(crate) fn from_db(lesson: &Lesson) -> Self {
        Self { id: lesson.id.clone(), title: lesson.title.clone(), order_index: lesson.order_index }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonProgressResponse {
    pub(crate) success: bool,
    pub(crate) module_finished: bool,
    pub(crate) course_finished: bool,
}
