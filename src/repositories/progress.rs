use sqlx::PgPool;

pub(crate) async fn mark_lesson_finished(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    lesson_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO lesson_progress (participation_id, lesson_id, finished, updated_at)
         VALUES ($1, $2, TRUE, $3)
         ON CONFLICT (participation_id, lesson_id)
         DO UPDATE SET finished = TRUE, updated_at = EXCLUDED.updated_at",
    )
    .bind(participation_id)
    .bind(lesson_id)
    .bind(updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn mark_module_finished(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    module_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO module_progress (participation_id, module_id, finished, updated_at)
         VALUES ($1, $2, TRUE, $3)
         ON CONFLICT (participation_id, module_id)
         DO UPDATE SET finished = TRUE, updated_at = EXCLUDED.updated_at",
    )
    .bind(participation_id)
    .bind(module_id)
    .bind(updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn mark_course_finished(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    course_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_progress (participation_id, course_id, finished, updated_at)
         VALUES ($1, $2, TRUE, $3)
         ON CONFLICT (participation_id, course_id)
         DO UPDATE SET finished = TRUE, updated_at = EXCLUDED.updated_at",
    )
    .bind(participation_id)
    .bind(course_id)
    .bind(updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Seeds the unfinished course row on enrollment; an existing row is left untouched.
pub(crate) async fn ensure_course_progress(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    course_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO course_progress (participation_id, course_id, finished, updated_at)
         VALUES ($1, $2, FALSE, $3)
         ON CONFLICT (participation_id, course_id) DO NOTHING",
    )
    .bind(participation_id)
    .bind(course_id)
    .bind(updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn count_finished_lessons_in_module(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    module_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM lesson_progress lp
         JOIN lessons l ON l.id = lp.lesson_id
         WHERE lp.participation_id = $1 AND l.module_id = $2 AND lp.finished",
    )
    .bind(participation_id)
    .bind(module_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn count_finished_modules_in_course(
    executor: impl sqlx::PgExecutor<'_>,
    participation_id: &str,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM module_progress mp
         JOIN modules m ON m.id = mp.module_id
         WHERE mp.participation_id = $1 AND m.course_id = $2 AND mp.finished",
    )
    .bind(participation_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn finished_lesson_ids(
    pool: &PgPool,
    participation_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT lesson_id FROM lesson_progress WHERE participation_id = $1 AND finished",
    )
    .bind(participation_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn finished_module_ids(
    pool: &PgPool,
    participation_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT module_id FROM module_progress WHERE participation_id = $1 AND finished",
    )
    .bind(participation_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn is_course_finished(
    pool: &PgPool,
    participation_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let finished = sqlx::query_scalar::<_, bool>(
        "SELECT finished FROM course_progress WHERE participation_id = $1 AND course_id = $2",
    )
    .bind(participation_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;
    Ok(finished.unwrap_or(false))
}

pub(crate) async fn count_for_lesson(pool: &PgPool, lesson_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lesson_progress WHERE lesson_id = $1")
        .bind(lesson_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn count_for_module(pool: &PgPool, module_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM module_progress WHERE module_id = $1")
        .bind(module_id)
        .fetch_one(pool)
        .await
}
