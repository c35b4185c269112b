use sqlx::PgPool;

use crate::repositories;
use crate::repositories::removal::{CourseDependents, DeletedRows};

#[derive(Debug, thiserror::Error)]
pub(crate) enum RemovalError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Test not found")]
    TestNotFound,
    #[error("Course still has {0}; pass cascade=true to remove them with the course")]
    HasDependents(CourseDependents),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemovalReport {
    pub(crate) deleted: DeletedRows,
}

impl RemovalReport {
    pub(crate) fn total_rows(&self) -> u64 {
        self.deleted.iter().map(|(_, rows)| rows).sum()
    }

    pub(crate) fn rows_for(&self, table: &str) -> u64 {
        self.deleted
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, rows)| *rows)
            .unwrap_or(0)
    }
}

/// Removes a course and everything beneath it in one transaction.
///
/// Without `cascade` only a bare course goes: any participation, wishlist
/// entry, module or test attempt refuses the removal. The course row is
/// locked first so enrollments cannot slip in between the check and the
/// deletes.
pub(crate) async fn remove_course(
    pool: &PgPool,
    course_id: &str,
    cascade: bool,
) -> Result<RemovalReport, RemovalError> {
    let mut tx = pool.begin().await?;

    repositories::courses::lock_by_id(&mut *tx, course_id)
        .await?
        .ok_or(RemovalError::CourseNotFound)?;

    if !cascade {
        let dependents =
            repositories::removal::count_course_dependents(&mut *tx, course_id).await?;
        if !dependents.is_empty() {
            return Err(RemovalError::HasDependents(dependents));
        }
    }

    let deleted = repositories::removal::delete_course_tree(&mut tx, course_id).await?;
    tx.commit().await?;

    Ok(RemovalReport { deleted })
}

/// Removes a test with its questions, answers and every attempt made on it.
pub(crate) async fn remove_test(pool: &PgPool, test_id: &str) -> Result<RemovalReport, RemovalError> {
    let mut tx = pool.begin().await?;

    repositories::lesson_tests::lock_by_id(&mut *tx, test_id)
        .await?
        .ok_or(RemovalError::TestNotFound)?;

    let deleted = repositories::removal::delete_test_tree(&mut tx, test_id).await?;
    tx.commit().await?;

    Ok(RemovalReport { deleted })
}

#[cfg(test)]
mod tests {
    use super::RemovalReport;

    #[test]
    fn report_sums_and_looks_up_tables() {
        let report = RemovalReport {
            deleted: vec![("answers", 4), ("questions", 2), ("tests", 1)],
        };
        assert_eq!(report.total_rows(), 7);
        assert_eq!(report.rows_for("questions"), 2);
        assert_eq!(report.rows_for("lessons"), 0);
    }
}
