use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{
    CategoryCourseCount, CourseShowcase, InstructorStats, LearnerInstructorRow, LearnerStats,
    TeachingStats,
};
use crate::db::types::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ContentKind {
    Module,
    Lesson,
    Test,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestAnalytics {
    pub(crate) test_id: String,
    pub(crate) title: String,
    pub(crate) max_attempts: i32,
    pub(crate) students_attempted: usize,
    pub(crate) students_completed: usize,
    pub(crate) avg_score: i64,
    pub(crate) avg_attempts: f64,
    pub(crate) completion_rate: i64,
    pub(crate) pass_rate: i64,
    pub(crate) difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonAnalytics {
    pub(crate) lesson_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) students_completed: usize,
    pub(crate) completion_rate: i64,
    pub(crate) avg_test_score: i64,
    pub(crate) has_tests: bool,
    pub(crate) tests: Vec<TestAnalytics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModuleAnalytics {
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) order_index: i32,
    pub(crate) students_completed: usize,
    pub(crate) completion_rate: i64,
    pub(crate) avg_lesson_completion: i64,
    pub(crate) avg_test_score: i64,
    pub(crate) total_tests: usize,
    pub(crate) lessons: Vec<LessonAnalytics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentHighlight {
    #[serde(rename = "type")]
    pub(crate) kind: ContentKind,
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) completion_rate: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsSummary {
    pub(crate) total_modules: usize,
    pub(crate) total_lessons: usize,
    pub(crate) total_tests: usize,
    pub(crate) avg_module_completion: i64,
    pub(crate) avg_lesson_completion: i64,
    pub(crate) avg_test_completion: i64,
    pub(crate) avg_test_score: i64,
    pub(crate) most_difficult_content: Option<ContentHighlight>,
    pub(crate) easiest_content: Option<ContentHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentAnalyticsResponse {
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) total_students: usize,
    pub(crate) modules: Vec<ModuleAnalytics>,
    pub(crate) summary: AnalyticsSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LearnerStatsResponse {
    pub(crate) enrolled_courses: i64,
    pub(crate) active_courses: i64,
    pub(crate) completed_courses: i64,
    pub(crate) instructors: i64,
}

impl From<LearnerStats> for LearnerStatsResponse {
    fn from(stats: LearnerStats) -> Self {
        Self {
            enrolled_courses: stats.enrolled_courses,
            active_courses: stats.active_courses,
            completed_courses: stats.completed_courses,
            instructors: stats.instructors,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeachingStatsResponse {
    pub(crate) students_count: i64,
    pub(crate) courses_count: i64,
    pub(crate) finished_participations: i64,
}

impl From<TeachingStats> for TeachingStatsResponse {
    fn from(stats: TeachingStats) -> Self {
        Self {
            students_count: stats.students_count,
            courses_count: stats.courses_count,
            finished_participations: stats.finished_participations,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryStatsResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) count: i64,
}

impl CategoryStatsResponse {
    pub(crate) fn from_db(row: CategoryCourseCount) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image: row.image,
            count: row.courses_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryStatsListResponse {
    pub(crate) categories: Vec<CategoryStatsResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseShowcaseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) creator_id: String,
    pub(crate) creator_name: String,
    pub(crate) category_name: String,
    pub(crate) students: i64,
    pub(crate) created_at: String,
}

impl CourseShowcaseResponse {
    pub(crate) fn from_db(course: CourseShowcase) -> Self {
        Self {
            creator_name: full_name(&course.creator_first_name, &course.creator_last_name),
            id: course.id,
            title: course.title,
            description: course.description,
            image: course.image,
            creator_id: course.creator_id,
            category_name: course.category_name,
            students: course.students,
            created_at: format_primitive(course.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseShowcaseListResponse {
    pub(crate) courses: Vec<CourseShowcaseResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InstructorStatsResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) courses_count: i64,
    pub(crate) students_count: i64,
}

impl InstructorStatsResponse {
    pub(crate) fn from_db(row: InstructorStats) -> Self {
        Self {
            name: full_name(&row.first_name, &row.last_name),
            id: row.id,
            role: row.role,
            courses_count: row.courses_count,
            students_count: row.students_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorListResponse {
    pub(crate) instructors: Vec<InstructorStatsResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TaughtCourse {
    pub(crate) id: String,
    pub(crate) title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LearnerInstructorResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) courses_count: usize,
    pub(crate) courses: Vec<TaughtCourse>,
}

impl LearnerInstructorResponse {
    /// One entry per author in first-enrollment order, each listing the courses taken with them.
    pub(crate) fn group(rows: Vec<LearnerInstructorRow>) -> Vec<Self> {
        let mut grouped: Vec<Self> = Vec::new();
        for row in rows {
            let course = TaughtCourse { id: row.course_id, title: row.course_title };
            match grouped.iter_mut().find(|instructor| instructor.id == row.instructor_id) {
                Some(instructor) => instructor.courses.push(course),
                None => grouped.push(Self {
                    name: full_name(&row.first_name, &row.last_name),
                    id: row.instructor_id,
                    email: row.email,
                    courses_count: 0,
                    courses: vec![course],
                }),
            }
        }
        for instructor in &mut grouped {
            instructor.courses_count = instructor.courses.len();
        }
        grouped
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LearnerInstructorListResponse {
    pub(crate) instructors: Vec<LearnerInstructorResponse>,
    pub(crate) total: usize,
}

pub(crate) fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}
