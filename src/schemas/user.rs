use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{EnrolledCourse, User};
use crate::db::types::UserRole;
use crate::schemas::course::CourseResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrolledCourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) enrolled_at: String,
    pub(crate) finished: bool,
}

impl EnrolledCourseResponse {
    pub(crate) fn from_db(course: EnrolledCourse) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            image: course.image,
            enrolled_at: format_primitive(course.enrolled_at),
            finished: course.finished,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MyCoursesResponse {
    pub(crate) courses: Vec<EnrolledCourseResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct WishlistResponse {
    pub(crate) courses: Vec<CourseResponse>,
    pub(crate) total: usize,
}
