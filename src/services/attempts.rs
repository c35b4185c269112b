use sqlx::PgPool;
use uuid::Uuid;

use crate::core::{metrics, time::primitive_now_utc};
use crate::repositories;
use crate::services::progress;

#[derive(Debug, thiserror::Error)]
pub(crate) enum AttemptError {
    #[error("Test not found")]
    TestNotFound,
    #[error("Maximum attempts reached")]
    MaxAttemptsReached,
    #[error("Attempt not found")]
    AttemptNotFound,
    #[error("Attempt belongs to another user")]
    NotOwner,
    #[error("Test already completed")]
    AlreadyCompleted,
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Answer not found")]
    AnswerNotFound,
    #[error("Answer does not belong to the question")]
    AnswerMismatch,
    #[error("Question does not belong to this test")]
    QuestionMismatch,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartedAttempt {
    pub(crate) attempt_id: String,
    pub(crate) total_questions: i32,
    pub(crate) max_attempts: i32,
    pub(crate) attempt_number: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttemptScore {
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
}

impl AttemptScore {
    pub(crate) fn new(score: i32, total_questions: i32) -> Self {
        Self {
            score,
            total_questions,
            percentage: percentage(score, total_questions),
            passed: passed(score, total_questions),
        }
    }
}

/// Rounded share of correct answers; 0 for a test without questions.
pub(crate) fn percentage(score: i32, total_questions: i32) -> i32 {
    if total_questions <= 0 {
        return 0;
    }
    (f64::from(score) / f64::from(total_questions) * 100.0).round() as i32
}

/// `ceil(total * 0.6)`, computed in integers so 60% boundaries are exact.
pub(crate) fn passing_score(total_questions: i32) -> i32 {
    let total = total_questions.max(0);
    (total * 3 + 4) / 5
}

pub(crate) fn passed(score: i32, total_questions: i32) -> bool {
    score >= passing_score(total_questions)
}

fn limit_reached(max_attempts: i32, prior_attempts: i64) -> bool {
    max_attempts > 0 && prior_attempts >= i64::from(max_attempts)
}

pub(crate) async fn start(
    pool: &PgPool,
    user_id: &str,
    test_id: &str,
) -> Result<StartedAttempt, AttemptError> {
    let mut tx = pool.begin().await?;

    let test = repositories::lesson_tests::find_by_id(&mut *tx, test_id)
        .await?
        .ok_or(AttemptError::TestNotFound)?;

    repositories::attempts::lock_starts(&mut *tx, test_id, user_id).await?;
    let prior_attempts = repositories::attempts::count_for_user(&mut *tx, test_id, user_id).await?;
    if limit_reached(test.max_attempts, prior_attempts) {
        return Err(AttemptError::MaxAttemptsReached);
    }

    let total_questions = repositories::questions::count_for_test(&mut *tx, test_id).await?;
    let total_questions = i32::try_from(total_questions).unwrap_or(i32::MAX);

    let attempt = repositories::attempts::create(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &Uuid::new_v4().to_string(),
            test_id,
            user_id,
            total_questions,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;

    metrics::record_attempt_started();
    tracing::info!(
        user_id = %user_id,
        test_id = %test_id,
        attempt_id = %attempt.id,
        total_questions,
        "Test attempt started"
    );

    Ok(StartedAttempt {
        attempt_id: attempt.id,
        total_questions: attempt.total_questions,
        max_attempts: test.max_attempts,
        attempt_number: prior_attempts + 1,
    })
}

/// Records the caller's choice for one question and returns whether it was correct.
/// The attempt row stays locked until the answer is stored, so an answer can
/// never land on an attempt that `complete` has already scored.
pub(crate) async fn submit_answer(
    pool: &PgPool,
    user_id: &str,
    attempt_id: &str,
    question_id: &str,
    selected_answer_id: &str,
) -> Result<bool, AttemptError> {
    let mut tx = pool.begin().await?;

    let attempt = repositories::attempts::lock_by_id(&mut *tx, attempt_id)
        .await?
        .ok_or(AttemptError::AttemptNotFound)?;
    if attempt.user_id != user_id {
        return Err(AttemptError::NotOwner);
    }
    if attempt.completed {
        return Err(AttemptError::AlreadyCompleted);
    }

    let answer = repositories::questions::find_answer(&mut *tx, selected_answer_id)
        .await?
        .ok_or(AttemptError::AnswerNotFound)?;
    if answer.question_id != question_id {
        return Err(AttemptError::AnswerMismatch);
    }

    let question = repositories::questions::find_by_id(&mut *tx, question_id)
        .await?
        .ok_or(AttemptError::QuestionNotFound)?;
    if question.test_id != attempt.test_id {
        return Err(AttemptError::QuestionMismatch);
    }

    let stored = repositories::attempts::record_answer(
        &mut *tx,
        repositories::attempts::RecordAnswer {
            id: &Uuid::new_v4().to_string(),
            attempt_id,
            question_id,
            selected_answer_id,
            correct: answer.correct,
            answered_at: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;

    Ok(stored.correct)
}

/// Scores and closes an attempt. A passing score finishes the test's lesson;
/// failures of that follow-up are logged and never reach the caller.
pub(crate) async fn complete(
    pool: &PgPool,
    user_id: &str,
    attempt_id: &str,
) -> Result<AttemptScore, AttemptError> {
    let mut tx = pool.begin().await?;

    let attempt = repositories::attempts::lock_by_id(&mut *tx, attempt_id)
        .await?
        .ok_or(AttemptError::AttemptNotFound)?;
    if attempt.user_id != user_id {
        return Err(AttemptError::NotOwner);
    }
    if attempt.completed {
        return Err(AttemptError::AlreadyCompleted);
    }

    let correct = repositories::attempts::count_correct_answers(&mut *tx, attempt_id).await?;
    let score = i32::try_from(correct).unwrap_or(i32::MAX);

    let closed =
        repositories::attempts::complete(&mut *tx, attempt_id, score, primitive_now_utc())
            .await?
            .ok_or(AttemptError::AlreadyCompleted)?;

    tx.commit().await?;

    let result = AttemptScore::new(closed.score, closed.total_questions);
    metrics::record_attempt_completed(result.passed);
    tracing::info!(
        user_id = %user_id,
        attempt_id = %attempt_id,
        score = result.score,
        total_questions = result.total_questions,
        passed = result.passed,
        "Test attempt completed"
    );

    if result.passed {
        finish_lesson_best_effort(pool, user_id, &closed.test_id).await;
    }

    Ok(result)
}

async fn finish_lesson_best_effort(pool: &PgPool, user_id: &str, test_id: &str) {
    let test = match repositories::lesson_tests::find_by_id(pool, test_id).await {
        Ok(Some(test)) => test,
        Ok(None) => {
            tracing::warn!(test_id = %test_id, "Passed test vanished before lesson completion");
            return;
        }
        Err(error) => {
            tracing::warn!(error = %error, test_id = %test_id, "Failed to load passed test");
            return;
        }
    };

    if let Err(error) = progress::mark_lesson_finished(pool, user_id, &test.lesson_id).await {
        tracing::warn!(
            error = %error,
            user_id = %user_id,
            lesson_id = %test.lesson_id,
            "Failed to record lesson progress after passed test"
        );
    }
}
