use sqlx::{PgPool, Postgres, Transaction};

use crate::core::{metrics, time::primitive_now_utc};
use crate::repositories;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProgressError {
    #[error("Lesson not found")]
    LessonNotFound,
    #[error("Module not found")]
    ModuleNotFound,
    #[error("User is not enrolled in this course")]
    NotEnrolled,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Which levels above the lesson were completed by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Propagation {
    pub(crate) module_finished: bool,
    pub(crate) course_finished: bool,
}

/// A level counts as finished only when it has children and all of them are finished.
pub(crate) fn level_finished(finished: i64, total: i64) -> bool {
    total > 0 && finished == total
}

/// Marks a lesson finished for `user_id` and cascades completion up to the
/// module and course. Lesson upsert and cascade commit together.
pub(crate) async fn mark_lesson_finished(
    pool: &PgPool,
    user_id: &str,
    lesson_id: &str,
) -> Result<Propagation, ProgressError> {
    let mut tx = pool.begin().await?;

    let placement = repositories::lessons::find_placement(&mut *tx, lesson_id)
        .await?
        .ok_or(ProgressError::LessonNotFound)?;
    let course_id = placement.course_id.ok_or(ProgressError::ModuleNotFound)?;

    // Concurrent completions in one course must see each other's lesson rows.
    let participation_id = repositories::participations::lock_id(&mut *tx, user_id, &course_id)
        .await?
        .ok_or(ProgressError::NotEnrolled)?;

    let now = primitive_now_utc();
    repositories::progress::mark_lesson_finished(&mut *tx, &participation_id, lesson_id, now)
        .await?;

    let outcome =
        propagate(&mut tx, &participation_id, &placement.module_id, &course_id, now).await?;

    tx.commit().await?;

    metrics::record_lesson_completion(outcome.module_finished, outcome.course_finished);
    tracing::debug!(
        user_id = %user_id,
        lesson_id = %lesson_id,
        module_finished = outcome.module_finished,
        course_finished = outcome.course_finished,
        "Lesson marked finished"
    );

    Ok(outcome)
}

async fn propagate(
    tx: &mut Transaction<'_, Postgres>,
    participation_id: &str,
    module_id: &str,
    course_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<Propagation, sqlx::Error> {
    let total_lessons = repositories::lessons::count_for_module(&mut **tx, module_id).await?;
    let finished_lessons = repositories::progress::count_finished_lessons_in_module(
        &mut **tx,
        participation_id,
        module_id,
    )
    .await?;

    if !level_finished(finished_lessons, total_lessons) {
        return Ok(Propagation::default());
    }

    repositories::progress::mark_module_finished(&mut **tx, participation_id, module_id, now)
        .await?;

    let total_modules = repositories::modules::count_for_course(&mut **tx, course_id).await?;
    let finished_modules = repositories::progress::count_finished_modules_in_course(
        &mut **tx,
        participation_id,
        course_id,
    )
    .await?;

    if !level_finished(finished_modules, total_modules) {
        return Ok(Propagation { module_finished: true, course_finished: false });
    }

    repositories::progress::mark_course_finished(&mut **tx, participation_id, course_id, now)
        .await?;

    Ok(Propagation { module_finished: true, course_finished: true })
}

#[cfg(test)]
mod tests {
    use super::level_finished;

    #[test]
    fn empty_level_is_never_finished() {
        assert!(!level_finished(0, 0));
    }

    #[test]
    fn partial_level_is_not_finished() {
        assert!(!level_finished(2, 3));
    }

    #[test]
    fn complete_level_is_finished() {
        assert!(level_finished(3, 3));
        assert!(level_finished(1, 1));
    }
}
