use sqlx::PgPool;

use crate::db::models::{TestAttempt, UserAnswer};

const COLUMNS: &str =
    "id, test_id, user_id, score, total_questions, completed, created_at, completed_at";

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) total_questions: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct RecordAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) attempt_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) selected_answer_id: &'a str,
    pub(crate) correct: bool,
    pub(crate) answered_at: time::PrimitiveDateTime,
}

/// Serialises attempt starts for one (test, user) pair until the transaction ends.
pub(crate) async fn lock_starts(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1 || ':' || $2, 0))")
        .bind(test_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn count_for_user(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
    user_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM test_attempts WHERE test_id = $1 AND user_id = $2",
    )
    .bind(test_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<TestAttempt, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(&format!(
        "INSERT INTO test_attempts (
            id, test_id, user_id, score, total_questions, completed, created_at
         ) VALUES ($1,$2,$3,0,$4,FALSE,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.user_id)
    .bind(params.total_questions)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

/// Locks the attempt row so answering and completing cannot interleave.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<Option<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(&format!(
        "SELECT {COLUMNS} FROM test_attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(attempt_id)
    .fetch_optional(executor)
    .await
}

/// One answer per (attempt, question); answering again replaces the choice.
pub(crate) async fn record_answer(
    executor: impl sqlx::PgExecutor<'_>,
    params: RecordAnswer<'_>,
) -> Result<UserAnswer, sqlx::Error> {
    sqlx::query_as::<_, UserAnswer>(
        "INSERT INTO user_answers (
            id, attempt_id, question_id, selected_answer_id, correct, answered_at
         ) VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (attempt_id, question_id)
         DO UPDATE SET selected_answer_id = EXCLUDED.selected_answer_id,
                       correct = EXCLUDED.correct,
                       answered_at = EXCLUDED.answered_at
         RETURNING id, attempt_id, question_id, selected_answer_id, correct, answered_at",
    )
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_answer_id)
    .bind(params.correct)
    .bind(params.answered_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn count_correct_answers(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_answers WHERE attempt_id = $1 AND correct",
    )
    .bind(attempt_id)
    .fetch_one(executor)
    .await
}

/// Closes an open attempt. Returns `None` when it was already completed.
pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: &str,
    score: i32,
    completed_at: time::PrimitiveDateTime,
) -> Result<Option<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(&format!(
        "UPDATE test_attempts
         SET score = $1, completed = TRUE, completed_at = $2
         WHERE id = $3 AND completed = FALSE
         RETURNING {COLUMNS}",
    ))
    .bind(score)
    .bind(completed_at)
    .bind(attempt_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    test_id: &str,
    user_id: &str,
) -> Result<Vec<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(&format!(
        "SELECT {COLUMNS} FROM test_attempts
         WHERE test_id = $1 AND user_id = $2
         ORDER BY created_at DESC, id DESC",
    ))
    .bind(test_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_user_in_course(
    pool: &PgPool,
    user_id: &str,
    course_id: &str,
) -> Result<Vec<TestAttempt>, sqlx::Error> {
    sqlx::query_as::<_, TestAttempt>(
        "SELECT ta.id, ta.test_id, ta.user_id, ta.score, ta.total_questions, ta.completed,
                ta.created_at, ta.completed_at
         FROM test_attempts ta
         JOIN tests t ON t.id = ta.test_id
         JOIN lessons l ON l.id = t.lesson_id
         JOIN modules m ON m.id = l.module_id
         WHERE ta.user_id = $1 AND m.course_id = $2
         ORDER BY ta.created_at",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await
}
