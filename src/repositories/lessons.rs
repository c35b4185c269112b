use sqlx::PgPool;

use crate::db::models::{Lesson, LessonPlacement};

const COLUMNS: &str = "id, module_id, title, content, order_index, created_at";

pub(crate) struct CreateLesson<'a> {
    pub(crate) id: &'a str,
    pub(crate) module_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) order_index: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateLesson {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) order_index: Option<i32>,
}

pub(crate) async fn create(pool: &PgPool, params: CreateLesson<'_>) -> Result<Lesson, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (id, module_id, title, content, order_index, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.module_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.order_index)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, lesson_id: &str) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {COLUMNS} FROM lessons WHERE id = $1"))
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}

/// Resolves the module, course and course creator a lesson sits under.
/// `course_id`/`creator_id` are `None` when the parent module is missing.
pub(crate) async fn find_placement(
    executor: impl sqlx::PgExecutor<'_>,
    lesson_id: &str,
) -> Result<Option<LessonPlacement>, sqlx::Error> {
    sqlx::query_as::<_, LessonPlacement>(
        "SELECT l.module_id, m.course_id, c.creator_id
         FROM lessons l
         LEFT JOIN modules m ON m.id = l.module_id
         LEFT JOIN courses c ON c.id = m.course_id
         WHERE l.id = $1",
    )
    .bind(lesson_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_module(
    pool: &PgPool,
    module_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {COLUMNS} FROM lessons WHERE module_id = $1 ORDER BY order_index, created_at, id"
    ))
    .bind(module_id)
    .fetch_all(pool)
    .await
}

/// Every lesson of a course, in module order then lesson order.
pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        "SELECT l.id, l.module_id, l.title, l.content, l.order_index, l.created_at
         FROM lessons l
         JOIN modules m ON m.id = l.module_id
         WHERE m.course_id = $1
         ORDER BY m.order_index, m.created_at, m.id, l.order_index, l.created_at, l.id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_module(
    executor: impl sqlx::PgExecutor<'_>,
    module_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons WHERE module_id = $1")
        .bind(module_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn count_for_course(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM lessons l JOIN modules m ON m.id = l.module_id WHERE m.course_id = $1",
    )
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    lesson_id: &str,
    params: UpdateLesson,
) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "UPDATE lessons SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            order_index = COALESCE($3, order_index)
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.content)
    .bind(params.order_index)
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, lesson_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM lessons WHERE id = $1").bind(lesson_id).execute(pool).await?;
    Ok(result.rows_affected())
}
