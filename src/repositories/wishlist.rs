use sqlx::PgPool;

use crate::db::models::Course;

/// Returns `true` when a new entry was stored.
pub(crate) async fn add(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO wishlist (user_id, course_id, created_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn remove(pool: &PgPool, user_id: &str, course_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn contains(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM wishlist WHERE user_id = $1 AND course_id = $2)",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_courses(pool: &PgPool, user_id: &str) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.title, c.description, c.image, c.category_id, c.creator_id,
                c.created_at, c.updated_at
         FROM wishlist w
         JOIN courses c ON c.id = w.course_id
         WHERE w.user_id = $1
         ORDER BY w.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
