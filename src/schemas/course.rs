use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, CourseSummary, StudentProgressRow};
use crate::schemas::module::ModuleWithLessonsResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) image: Option<String>,
    #[validate(length(min = 1, message = "categoryId must not be empty"))]
    pub(crate) category_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) image: Option<String>,
    #[serde(default)]
    pub(crate) category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseListQuery {
    #[serde(default)]
    pub(crate) category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseDeleteQuery {
    #[serde(default)]
    pub(crate) cascade: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) category_id: String,
    pub(crate) creator_id: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            image: course.image,
            category_id: course.category_id,
            creator_id: course.creator_id,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) category_id: String,
    pub(crate) creator_id: String,
    pub(crate) created_at: String,
    pub(crate) modules_count: i64,
}

impl CourseSummaryResponse {
    pub(crate) fn from_db(course: CourseSummary) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            image: course.image,
            category_id: course.category_id,
            creator_id: course.creator_id,
            created_at: format_primitive(course.created_at),
            modules_count: course.modules_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseListResponse {
    pub(crate) courses: Vec<CourseSummaryResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailResponse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) modules: Vec<ModuleWithLessonsResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParticipationResponse {
    pub(crate) participation_id: String,
    pub(crate) course_id: String,
    pub(crate) already_participating: bool,
    pub(crate) in_wishlist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistEntryResponse {
    pub(crate) course_id: String,
    pub(crate) in_wishlist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentProgressResponse {
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) enrolled_at: String,
    pub(crate) finished_lessons: i64,
    pub(crate) percentage: i32,
    pub(crate) course_finished: bool,
}

impl StudentProgressResponse {
    pub(crate) fn from_db(row: StudentProgressRow, total_lessons: i64) -> Self {
        Self {
            percentage: lesson_percentage(row.finished_lessons, total_lessons),
            user_id: row.user_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            enrolled_at: format_primitive(row.enrolled_at),
            finished_lessons: row.finished_lessons,
            course_finished: row.course_finished,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentsProgressResponse {
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) total_lessons: i64,
    pub(crate) total_students: usize,
    pub(crate) students: Vec<StudentProgressResponse>,
}

pub(crate) fn lesson_percentage(finished: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    ((finished as f64 / total as f64) * 100.0).round() as i32
}
