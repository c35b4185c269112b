use sqlx::PgPool;

use crate::db::models::{CourseParticipation, StudentProgressRow};

const COLUMNS: &str = "id, user_id, course_id, created_at";

pub(crate) async fn find(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
) -> Result<Option<CourseParticipation>, sqlx::Error> {
    sqlx::query_as::<_, CourseParticipation>(&format!(
        "SELECT {COLUMNS} FROM course_participations WHERE user_id = $1 AND course_id = $2"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_id(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM course_participations WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

/// Same lookup as [`find_id`] but holds the row lock until the transaction ends,
/// serialising progress writes for one participant.
pub(crate) async fn lock_id(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM course_participations WHERE user_id = $1 AND course_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

/// Inserts the participation unless the pair already exists.
/// Returns `None` when another row already holds (user, course).
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    user_id: &str,
    course_id: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Option<CourseParticipation>, sqlx::Error> {
    sqlx::query_as::<_, CourseParticipation>(&format!(
        "INSERT INTO course_participations (id, user_id, course_id, created_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (user_id, course_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(course_id)
    .bind(created_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course_participations WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_student_progress(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<StudentProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentProgressRow>(
        "SELECT u.id AS user_id, u.username, u.first_name, u.last_name,
                p.created_at AS enrolled_at,
                (SELECT COUNT(*)
                   FROM lesson_progress lp
                   JOIN lessons l ON l.id = lp.lesson_id
                   JOIN modules m ON m.id = l.module_id
                  WHERE lp.participation_id = p.id
                    AND lp.finished
                    AND m.course_id = p.course_id) AS finished_lessons,
                COALESCE(cp.finished, FALSE) AS course_finished
         FROM course_participations p
         JOIN users u ON u.id = p.user_id
         LEFT JOIN course_progress cp
           ON cp.participation_id = p.id AND cp.course_id = p.course_id
         WHERE p.course_id = $1
         ORDER BY p.created_at, u.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
