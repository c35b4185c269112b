//! Read-only course progress view assembled from already-fetched rows.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::core::time::format_primitive;
use crate::db::models::{Course, Lesson, LessonTest, Module, TestAttempt};
use crate::repositories;
use crate::schemas::progress::{
    CourseProgressResponse, LessonProgressView, ModuleProgressView, TestProgressView,
};
use crate::services::attempts::AttemptScore;
use crate::services::progress::ProgressError;

/// Course structure plus one user's state inside it.
pub(crate) struct ProgressInputs<'a> {
    pub(crate) modules: &'a [Module],
    pub(crate) lessons: &'a [Lesson],
    pub(crate) tests: &'a [LessonTest],
    pub(crate) attempts: &'a [TestAttempt],
    pub(crate) finished_lessons: &'a HashSet<String>,
    pub(crate) finished_modules: &'a HashSet<String>,
    pub(crate) course_finished: bool,
}

/// Builds the view for `user_id`. The course creator gets the all-zero author view.
pub(crate) async fn course_report(
    pool: &PgPool,
    course: &Course,
    user_id: &str,
) -> Result<CourseProgressResponse, ProgressError> {
    let modules = repositories::modules::list_for_course(pool, &course.id).await?;
    let lessons = repositories::lessons::list_for_course(pool, &course.id).await?;
    let tests = repositories::lesson_tests::list_for_course(pool, &course.id).await?;

    if course.creator_id == user_id {
        let empty = HashSet::new();
        let inputs = ProgressInputs {
            modules: &modules,
            lessons: &lessons,
            tests: &tests,
            attempts: &[],
            finished_lessons: &empty,
            finished_modules: &empty,
            course_finished: false,
        };
        let mut report = build(&course.id, user_id, &inputs);
        report.is_author = true;
        return Ok(report);
    }

    let participation_id = repositories::participations::find_id(pool, user_id, &course.id)
        .await?
        .ok_or(ProgressError::NotEnrolled)?;

    let finished_lessons: HashSet<String> =
        repositories::progress::finished_lesson_ids(pool, &participation_id)
            .await?
            .into_iter()
            .collect();
    let finished_modules: HashSet<String> =
        repositories::progress::finished_module_ids(pool, &participation_id)
            .await?
            .into_iter()
            .collect();
    let course_finished =
        repositories::progress::is_course_finished(pool, &participation_id, &course.id).await?;
    let attempts =
        repositories::attempts::list_for_user_in_course(pool, user_id, &course.id).await?;

    let inputs = ProgressInputs {
        modules: &modules,
        lessons: &lessons,
        tests: &tests,
        attempts: &attempts,
        finished_lessons: &finished_lessons,
        finished_modules: &finished_modules,
        course_finished,
    };
    Ok(build(&course.id, user_id, &inputs))
}

pub(crate) fn build(
    course_id: &str,
    user_id: &str,
    inputs: &ProgressInputs<'_>,
) -> CourseProgressResponse {
    let modules: Vec<ModuleProgressView> = inputs
        .modules
        .iter()
        .map(|module| {
            let lessons: Vec<LessonProgressView> = inputs
                .lessons
                .iter()
                .filter(|lesson| lesson.module_id == module.id)
                .map(|lesson| LessonProgressView {
                    lesson_id: lesson.id.clone(),
                    title: lesson.title.clone(),
                    order_index: lesson.order_index,
                    completed: inputs.finished_lessons.contains(&lesson.id),
                    tests: inputs
                        .tests
                        .iter()
                        .filter(|test| test.lesson_id == lesson.id)
                        .map(|test| summarize_test(test, inputs.attempts))
                        .collect(),
                })
                .collect();

            let completed_lessons = lessons.iter().filter(|lesson| lesson.completed).count();
            ModuleProgressView {
                module_id: module.id.clone(),
                title: module.title.clone(),
                order_index: module.order_index,
                completed: inputs.finished_modules.contains(&module.id),
                total_lessons: lessons.len(),
                completed_lessons,
                progress: share(completed_lessons, lessons.len()),
                lessons,
            }
        })
        .collect();

    let total_lessons = inputs.lessons.len();
    let completed_lessons: usize = modules.iter().map(|module| module.completed_lessons).sum();
    let completed_modules = modules.iter().filter(|module| module.completed).count();

    CourseProgressResponse {
        course_id: course_id.to_string(),
        user_id: user_id.to_string(),
        is_author: false,
        course_completed: inputs.course_finished,
        overall_progress: share(completed_lessons, total_lessons),
        total_modules: modules.len(),
        completed_modules,
        total_lessons,
        completed_lessons,
        modules,
    }
}

/// Best completed attempt wins on score; the earliest one wins ties.
fn summarize_test(test: &LessonTest, attempts: &[TestAttempt]) -> TestProgressView {
    let mine: Vec<&TestAttempt> =
        attempts.iter().filter(|attempt| attempt.test_id == test.id).collect();
    let completed: Vec<&TestAttempt> =
        mine.iter().copied().filter(|attempt| attempt.completed).collect();

    let best = completed.iter().copied().fold(None::<&TestAttempt>, |best, current| match best {
        Some(best) if best.score >= current.score => Some(best),
        _ => Some(current),
    });
    let best_result = best.map(|attempt| AttemptScore::new(attempt.score, attempt.total_questions));

    TestProgressView {
        test_id: test.id.clone(),
        max_attempts: test.max_attempts,
        attempts_count: mine.len(),
        completed_attempts: completed.len(),
        best_score: best_result.map(|result| result.score).unwrap_or(0),
        best_percentage: best_result.map(|result| result.percentage).unwrap_or(0),
        passed: best_result.map(|result| result.passed).unwrap_or(false),
        last_attempt_at: mine
            .iter()
            .map(|attempt| attempt.created_at)
            .max()
            .map(format_primitive),
    }
}

pub(crate) fn share(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::macros::datetime;

    use super::{build, ProgressInputs};
    use crate::db::models::{Lesson, LessonTest, Module, TestAttempt};

    fn module(id: &str, order_index: i32) -> Module {
        Module {
            id: id.to_string(),
            course_id: "course".to_string(),
            title: format!("Module {id}"),
            description: String::new(),
            order_index,
            created_at: datetime!(2025-01-01 00:00:00),
        }
    }

    fn lesson(id: &str, module_id: &str) -> Lesson {
        Lesson {
            id: id.to_string(),
            module_id: module_id.to_string(),
            title: format!("Lesson {id}"),
            content: String::new(),
            order_index: 0,
            created_at: datetime!(2025-01-01 00:00:00),
        }
    }

    fn attempt(id: &str, score: i32, total: i32, completed: bool, minute: u8) -> TestAttempt {
        let created_at = datetime!(2025-02-01 10:00:00).replace_minute(minute).expect("minute");
        TestAttempt {
            id: id.to_string(),
            test_id: "quiz".to_string(),
            user_id: "student".to_string(),
            score,
            total_questions: total,
            completed,
            created_at,
            completed_at: completed.then_some(created_at),
        }
    }

    #[test]
    fn counts_finished_lessons_per_module_and_overall() {
        let modules = vec![module("m1", 0), module("m2", 1)];
        let lessons = vec![lesson("l1", "m1"), lesson("l2", "m1"), lesson("l3", "m2")];
        let finished_lessons: HashSet<String> = ["l1".to_string(), "l2".to_string()].into();
        let finished_modules: HashSet<String> = ["m1".to_string()].into();

        let report = build(
            "course",
            "student",
            &ProgressInputs {
                modules: &modules,
                lessons: &lessons,
                tests: &[],
                attempts: &[],
                finished_lessons: &finished_lessons,
                finished_modules: &finished_modules,
                course_finished: false,
            },
        );

        assert_eq!(report.total_lessons, 3);
        assert_eq!(report.completed_lessons, 2);
        assert_eq!(report.completed_modules, 1);
        assert!(report.modules[0].completed);
        assert_eq!(report.modules[0].progress, 100.0);
        assert!(!report.modules[1].completed);
        assert_eq!(report.modules[1].completed_lessons, 0);
        assert!((report.overall_progress - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_uses_best_completed_attempt() {
        let modules = vec![module("m1", 0)];
        let lessons = vec![lesson("l1", "m1")];
        let tests = vec![LessonTest {
            id: "quiz".to_string(),
            lesson_id: "l1".to_string(),
            max_attempts: 3,
            created_at: datetime!(2025-01-01 00:00:00),
        }];
        let attempts = vec![
            attempt("a1", 2, 5, true, 1),
            attempt("a2", 4, 5, true, 2),
            attempt("a3", 0, 5, false, 3),
        ];
        let empty = HashSet::new();

        let report = build(
            "course",
            "student",
            &ProgressInputs {
                modules: &modules,
                lessons: &lessons,
                tests: &tests,
                attempts: &attempts,
                finished_lessons: &empty,
                finished_modules: &empty,
                course_finished: false,
            },
        );

        let summary = &report.modules[0].lessons[0].tests[0];
        assert_eq!(summary.attempts_count, 3);
        assert_eq!(summary.completed_attempts, 2);
        assert_eq!(summary.best_score, 4);
        assert_eq!(summary.best_percentage, 80);
        assert!(summary.passed);
        assert_eq!(summary.last_attempt_at.as_deref(), Some("2025-02-01T10:03:00Z"));
    }

    #[test]
    fn empty_course_reports_zero_progress() {
        let empty = HashSet::new();
        let report = build(
            "course",
            "student",
            &ProgressInputs {
                modules: &[],
                lessons: &[],
                tests: &[],
                attempts: &[],
                finished_lessons: &empty,
                finished_modules: &empty,
                course_finished: false,
            },
        );
        assert_eq!(report.overall_progress, 0.0);
        assert!(report.modules.is_empty());
    }
}
