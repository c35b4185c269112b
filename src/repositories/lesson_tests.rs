use sqlx::PgPool;

use crate::db::models::LessonTest;

const COLUMNS: &str = "id, lesson_id, max_attempts, created_at";

pub(crate) struct CreateLessonTest<'a> {
    pub(crate) id: &'a str,
    pub(crate) lesson_id: &'a str,
    pub(crate) max_attempts: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateLessonTest<'_>,
) -> Result<LessonTest, sqlx::Error> {
    sqlx::query_as::<_, LessonTest>(&format!(
        "INSERT INTO tests (id, lesson_id, max_attempts, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.lesson_id)
    .bind(params.max_attempts)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<Option<LessonTest>, sqlx::Error> {
    sqlx::query_as::<_, LessonTest>(&format!("SELECT {COLUMNS} FROM tests WHERE id = $1"))
        .bind(test_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM tests WHERE id = $1 FOR UPDATE")
        .bind(test_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_lesson(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Option<LessonTest>, sqlx::Error> {
    sqlx::query_as::<_, LessonTest>(&format!("SELECT {COLUMNS} FROM tests WHERE lesson_id = $1"))
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<LessonTest>, sqlx::Error> {
    sqlx::query_as::<_, LessonTest>(
        "SELECT t.id, t.lesson_id, t.max_attempts, t.created_at
         FROM tests t
         JOIN lessons l ON l.id = t.lesson_id
         JOIN modules m ON m.id = l.module_id
         WHERE m.course_id = $1",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update_max_attempts(
    pool: &PgPool,
    test_id: &str,
    max_attempts: i32,
) -> Result<Option<LessonTest>, sqlx::Error> {
    sqlx::query_as::<_, LessonTest>(&format!(
        "UPDATE tests SET max_attempts = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(max_attempts)
    .bind(test_id)
    .fetch_optional(pool)
    .await
}
