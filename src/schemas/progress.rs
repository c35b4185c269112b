use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressQuery {
    #[serde(default)]
    pub(crate) user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestProgressView {
    pub(crate) test_id: String,
    pub(crate) max_attempts: i32,
    pub(crate) attempts_count: usize,
    pub(crate) completed_attempts: usize,
    pub(crate) best_score: i32,
    pub(crate) best_percentage: i32,
    pub(crate) passed: bool,
    pub(crate) last_attempt_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonProgressView {
    pub(crate) lesson_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) completed: bool,
    pub(crate) tests: Vec<TestProgressView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleProgressView {
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) completed: bool,
    pub(crate) total_lessons: usize,
    pub(crate) completed_lessons: usize,
    pub(crate) progress: f64,
    pub(crate) lessons: Vec<LessonProgressView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseProgressResponse {
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) is_author: bool,
    pub(crate) course_completed: bool,
    pub(crate) overall_progress: f64,
    pub(crate) total_modules: usize,
    pub(crate) completed_modules: usize,
    pub(crate) total_lessons: usize,
    pub(crate) completed_lessons: usize,
    pub(crate) modules: Vec<ModuleProgressView>,
}
