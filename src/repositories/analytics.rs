//! Aggregate reads behind the analytics and showcase endpoints.

use sqlx::PgPool;

use crate::db::models::{
    CategoryCourseCount, CourseShowcase, InstructorStats, LearnerInstructorRow, LearnerStats,
    TeachingStats, TestAttempt,
};

const SHOWCASE_SELECT: &str = "SELECT c.id, c.title, c.description, c.image, c.creator_id,
        cat.name AS category_name,
        u.first_name AS creator_first_name, u.last_name AS creator_last_name,
        (SELECT COUNT(*) FROM course_participations p WHERE p.course_id = c.id) AS students,
        c.created_at
     FROM courses c
     JOIN categories cat ON cat.id = c.category_id
     JOIN users u ON u.id = c.creator_id";

/// `(lesson_id, participants who finished it)` for lessons of one course.
pub(crate) async fn finished_lesson_counts(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT lp.lesson_id, COUNT(*)
         FROM lesson_progress lp
         JOIN course_participations p ON p.id = lp.participation_id
         WHERE p.course_id = $1 AND lp.finished
         GROUP BY lp.lesson_id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

/// `(module_id, participants who finished it)` for modules of one course.
pub(crate) async fn finished_module_counts(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT mp.module_id, COUNT(*)
         FROM module_progress mp
         JOIN course_participations p ON p.id = mp.participation_id
         WHERE p.course_id = $1 AND mp.finished
         GROUP BY mp.module_id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

/// Attempts on the course's tests made by its current participants, oldest first.
pub(crate) async fn participant_attempts(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(
        "SELECT ta.id, ta.test_id, ta.user_id, ta.score, ta.total_questions, ta.completed,
                ta.created_at, ta.completed_at
         FROM test_attempts ta
         JOIN tests t ON t.id = ta.test_id
         JOIN lessons l ON l.id = t.lesson_id
         JOIN modules m ON m.id = l.module_id
         JOIN course_participations p ON p.user_id = ta.user_id AND p.course_id = m.course_id
         WHERE m.course_id = $1
         ORDER BY ta.created_at",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn learner_stats(pool: &PgPool, user_id: &str) -> Result<LearnerStats, sqlx::Error> {
    sqlx::query_as::<_, LearnerStats>(
        "SELECT COUNT(*) AS enrolled_courses,
                COUNT(*) FILTER (WHERE NOT COALESCE(cp.finished, FALSE)) AS active_courses,
                COUNT(*) FILTER (WHERE COALESCE(cp.finished, FALSE)) AS completed_courses,
                COUNT(DISTINCT c.creator_id) AS instructors
         FROM course_participations p
         JOIN courses c ON c.id = p.course_id
         LEFT JOIN course_progress cp
           ON cp.participation_id = p.id AND cp.course_id = p.course_id
         WHERE p.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn teaching_stats(
    pool: &PgPool,
    user_id: &str,
) -> Result<TeachingStats, sqlx::Error> {
    sqlx::query_as::<_, TeachingStats>(
        "SELECT
            (SELECT COUNT(*) FROM course_participations p
               JOIN courses c ON c.id = p.course_id
              WHERE c.creator_id = $1) AS students_count,
            (SELECT COUNT(*) FROM courses WHERE creator_id = $1) AS courses_count,
            (SELECT COUNT(*) FROM course_progress cp
               JOIN courses c ON c.id = cp.course_id
              WHERE c.creator_id = $1 AND cp.finished) AS finished_participations",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn categories_with_counts(
    pool: &PgPool,
) -> Result<Vec<CategoryCourseCount>, sqlx::Error> {
    sqlx::query_as::<_, CategoryCourseCount>(
        "SELECT cat.id, cat.name, cat.description, cat.image,
                (SELECT COUNT(*) FROM courses c WHERE c.category_id = cat.id) AS courses_count
         FROM categories cat
         ORDER BY cat.name",
    )
    .fetch_all(pool)
    .await
}

/// Most enrolled first; newer courses break ties.
pub(crate) async fn popular_courses(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CourseShowcase>, sqlx::Error> {
    sqlx::query_as::<_, CourseShowcase>(&format!(
        "{SHOWCASE_SELECT} ORDER BY students DESC, c.created_at DESC, c.id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn recent_courses(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CourseShowcase>, sqlx::Error> {
    sqlx::query_as::<_, CourseShowcase>(&format!(
        "{SHOWCASE_SELECT} ORDER BY c.created_at DESC, c.id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Teachers with at least one course, ranked by total enrollments.
pub(crate) async fn top_instructors(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<InstructorStats>, sqlx::Error> {
    sqlx::query_as::<_, InstructorStats>(
        "SELECT u.id, u.first_name, u.last_name, u.role,
                COUNT(DISTINCT c.id) AS courses_count,
                COUNT(p.id) AS students_count
         FROM users u
         JOIN courses c ON c.creator_id = u.id
         LEFT JOIN course_participations p ON p.course_id = c.id
         WHERE u.role = 'teacher'
         GROUP BY u.id, u.first_name, u.last_name, u.role
         ORDER BY students_count DESC, u.id
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn learner_instructors(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<LearnerInstructorRow>, sqlx::Error> {
    sqlx::query_as::<_, LearnerInstructorRow>(
        "SELECT u.id AS instructor_id, u.first_name, u.last_name, u.email,
                c.id AS course_id, c.title AS course_title
         FROM course_participations p
         JOIN courses c ON c.id = p.course_id
         JOIN users u ON u.id = c.creator_id
         WHERE p.user_id = $1
         ORDER BY p.created_at, c.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
