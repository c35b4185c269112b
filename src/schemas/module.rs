use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Module;
use crate::schemas::lesson::LessonSummaryResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleCreate {
    #[validate(length(min = 1, message = "courseId must not be empty"))]
    pub(crate) course_id: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    /// Appended after the existing modules when omitted.
    #[serde(default)]
    #[validate(range(min = 0, message = "orderIndex must be non-negative"))]
    pub(crate) order_index: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "orderIndex must be non-negative"))]
    pub(crate) order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: String,
}

impl ModuleResponse {
    pub(crate) fn from_db(module: Module) -> Self {
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            description: module.description,
            order_index: module.order_index,
            created_at: format_primitive(module.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleWithLessonsResponse {
    #[serde(flatten)]
    pub(crate) module: ModuleResponse,
    pub(crate) lessons: Vec<LessonSummaryResponse>,
}
