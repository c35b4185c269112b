//! Subtree deletes. Foreign keys never cascade, so children go first.

use sqlx::{Postgres, Transaction};

const COURSE_TESTS: &str = "SELECT t.id FROM tests t
    JOIN lessons l ON l.id = t.lesson_id
    JOIN modules m ON m.id = l.module_id
    WHERE m.course_id = $1";

const COURSE_LESSONS: &str =
    "SELECT l.id FROM lessons l JOIN modules m ON m.id = l.module_id WHERE m.course_id = $1";

fn course_steps() -> Vec<(&'static str, String)> {
    vec![
        (
            "user_answers",
            format!(
                "DELETE FROM user_answers WHERE attempt_id IN \
                 (SELECT id FROM test_attempts WHERE test_id IN ({COURSE_TESTS}))"
            ),
        ),
        (
            "answers",
            format!(
                "DELETE FROM answers WHERE question_id IN \
                 (SELECT id FROM questions WHERE test_id IN ({COURSE_TESTS}))"
            ),
        ),
        ("questions", format!("DELETE FROM questions WHERE test_id IN ({COURSE_TESTS})")),
        ("test_attempts", format!("DELETE FROM test_attempts WHERE test_id IN ({COURSE_TESTS})")),
        ("tests", format!("DELETE FROM tests WHERE lesson_id IN ({COURSE_LESSONS})")),
        (
            "lesson_progress",
            format!("DELETE FROM lesson_progress WHERE lesson_id IN ({COURSE_LESSONS})"),
        ),
        (
            "lessons",
            "DELETE FROM lessons WHERE module_id IN (SELECT id FROM modules WHERE course_id = $1)"
                .to_string(),
        ),
        (
            "module_progress",
            "DELETE FROM module_progress \
             WHERE module_id IN (SELECT id FROM modules WHERE course_id = $1)"
                .to_string(),
        ),
        ("modules", "DELETE FROM modules WHERE course_id = $1".to_string()),
        ("course_progress", "DELETE FROM course_progress WHERE course_id = $1".to_string()),
        (
            "course_participations",
            "DELETE FROM course_participations WHERE course_id = $1".to_string(),
        ),
        ("wishlist", "DELETE FROM wishlist WHERE course_id = $1".to_string()),
        ("courses", "DELETE FROM courses WHERE id = $1".to_string()),
    ]
}

fn test_steps() -> Vec<(&'static str, String)> {
    vec![
        (
            "user_answers",
            "DELETE FROM user_answers \
             WHERE attempt_id IN (SELECT id FROM test_attempts WHERE test_id = $1)"
                .to_string(),
        ),
        ("test_attempts", "DELETE FROM test_attempts WHERE test_id = $1".to_string()),
        (
            "answers",
            "DELETE FROM answers \
             WHERE question_id IN (SELECT id FROM questions WHERE test_id = $1)"
                .to_string(),
        ),
        ("questions", "DELETE FROM questions WHERE test_id = $1".to_string()),
        ("tests", "DELETE FROM tests WHERE id = $1".to_string()),
    ]
}

/// Rows that still reference a course from outside its own row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct CourseDependents {
    pub(crate) participations: i64,
    pub(crate) wishlist: i64,
    pub(crate) modules: i64,
    pub(crate) attempts: i64,
}

impl CourseDependents {
    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for CourseDependents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            (self.participations, "participation"),
            (self.wishlist, "wishlist entry"),
            (self.modules, "module"),
            (self.attempts, "test attempt"),
        ];
        let mut first = true;
        for (count, noun) in parts.into_iter().filter(|(count, _)| *count > 0) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{count} {noun}(s)")?;
            first = false;
        }
        Ok(())
    }
}

pub(crate) async fn count_course_dependents(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<CourseDependents, sqlx::Error> {
    sqlx::query_as::<_, CourseDependents>(&format!(
        "SELECT
            (SELECT COUNT(*) FROM course_participations WHERE course_id = $1) AS participations,
            (SELECT COUNT(*) FROM wishlist WHERE course_id = $1) AS wishlist,
            (SELECT COUNT(*) FROM modules WHERE course_id = $1) AS modules,
            (SELECT COUNT(*) FROM test_attempts WHERE test_id IN ({COURSE_TESTS})) AS attempts"
    ))
    .bind(course_id)
    .fetch_one(executor)
    .await
}

/// Rows removed per table, in deletion order.
pub(crate) type DeletedRows = Vec<(&'static str, u64)>;

pub(crate) async fn delete_course_tree(
    tx: &mut Transaction<'_, Postgres>,
    course_id: &str,
) -> Result<DeletedRows, sqlx::Error> {
    run_steps(tx, course_steps(), course_id).await
}

pub(crate) async fn delete_test_tree(
    tx: &mut Transaction<'_, Postgres>,
    test_id: &str,
) -> Result<DeletedRows, sqlx::Error> {
    run_steps(tx, test_steps(), test_id).await
}

async fn run_steps(
    tx: &mut Transaction<'_, Postgres>,
    steps: Vec<(&'static str, String)>,
    root_id: &str,
) -> Result<DeletedRows, sqlx::Error> {
    let mut deleted = Vec::with_capacity(steps.len());
    for (table, statement) in steps {
        let result = sqlx::query(&statement).bind(root_id).execute(&mut **tx).await?;
        deleted.push((table, result.rows_affected()));
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::{course_steps, test_steps, CourseDependents};

    #[test]
    fn dependents_describe_only_present_rows() {
        let none = CourseDependents::default();
        assert!(none.is_empty());
        assert_eq!(none.to_string(), "");

        let some = CourseDependents { modules: 2, attempts: 1, ..CourseDependents::default() };
        assert!(!some.is_empty());
        assert_eq!(some.to_string(), "2 module(s), 1 test attempt(s)");
    }

    #[test]
    fn course_steps_delete_children_before_parents() {
        let order: Vec<&str> = course_steps().into_iter().map(|(table, _)| table).collect();
        assert_eq!(
            order,
            vec![
                "user_answers",
                "answers",
                "questions",
                "test_attempts",
                "tests",
                "lesson_progress",
                "lessons",
                "module_progress",
                "modules",
                "course_progress",
                "course_participations",
                "wishlist",
                "courses",
            ]
        );
    }

    #[test]
    fn test_steps_end_with_the_test_row() {
        let steps = test_steps();
        assert_eq!(steps.first().map(|(table, _)| *table), Some("user_answers"));
        assert_eq!(steps.last().map(|(table, _)| *table), Some("tests"));
    }
}
