use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Category {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) category_id: String,
    pub(crate) creator_id: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Course row joined with its module count for list views.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseSummary {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) category_id: String,
    pub(crate) creator_id: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) modules_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Module {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Lesson {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Lesson together with the course it ultimately belongs to.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct LessonPlacement {
    pub(crate) module_id: String,
    pub(crate) course_id: Option<String>,
    pub(crate) creator_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct LessonTest {
    pub(crate) id: String,
    pub(crate) lesson_id: String,
    pub(crate) max_attempts: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) text: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseParticipation {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestAttempt {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) user_id: String,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) completed: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct UserAnswer {
    pub(crate) id: String,
    pub(crate) attempt_id: String,
    pub(crate) question_id: String,
    pub(crate) selected_answer_id: String,
    pub(crate) correct: bool,
    pub(crate) answered_at: PrimitiveDateTime,
}

/// Enrolled course joined with the participant's course-level flag.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct EnrolledCourse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) enrolled_at: PrimitiveDateTime,
    pub(crate) finished: bool,
}

/// Per-participant lesson completion counts inside one course.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentProgressRow {
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
    pub(crate) finished_lessons: i64,
    pub(crate) course_finished: bool,
}

/// Course-level counters for one learner.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub(crate) struct LearnerStats {
    pub(crate) enrolled_courses: i64,
    pub(crate) active_courses: i64,
    pub(crate) completed_courses: i64,
    pub(crate) instructors: i64,
}

/// Enrollment counters over every course one author created.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub(crate) struct TeachingStats {
    pub(crate) students_count: i64,
    pub(crate) courses_count: i64,
    pub(crate) finished_participations: i64,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CategoryCourseCount {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) courses_count: i64,
}

/// Course card joined with category, author and enrollment count.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseShowcase {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: Option<String>,
    pub(crate) creator_id: String,
    pub(crate) category_name: String,
    pub(crate) creator_first_name: String,
    pub(crate) creator_last_name: String,
    pub(crate) students: i64,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct InstructorStats {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: UserRole,
    pub(crate) courses_count: i64,
    pub(crate) students_count: i64,
}

/// One enrolled course of a learner with the author who created it.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct LearnerInstructorRow {
    pub(crate) instructor_id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
}
