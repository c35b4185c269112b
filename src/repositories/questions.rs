use sqlx::PgPool;

use crate::db::models::{Answer, Question};

const QUESTION_COLUMNS: &str = "id, test_id, text, created_at";
const ANSWER_COLUMNS: &str = "id, question_id, text, correct";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) correct: bool,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, test_id, text, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {QUESTION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.text)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_for_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE test_id = $1 ORDER BY created_at, id"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_test(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn create_answer(
    pool: &PgPool,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, question_id, text, correct)
         VALUES ($1,$2,$3,$4)
         RETURNING {ANSWER_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.text)
    .bind(params.correct)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_answer(
    executor: impl sqlx::PgExecutor<'_>,
    answer_id: &str,
) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {ANSWER_COLUMNS} FROM answers WHERE id = $1"))
        .bind(answer_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_answers_for_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(
        "SELECT a.id, a.question_id, a.text, a.correct
         FROM answers a
         JOIN questions q ON q.id = a.question_id
         WHERE q.test_id = $1
         ORDER BY a.id",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}
