//! Per-course content analytics for the course author.
//!
//! Every rate is the share of *current participants*: a lesson finished by 3 of
//! 4 enrolled students reports 75. Test figures use each student's best completed
//! attempt, the same rule the progress view applies.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::db::models::{Course, Lesson, LessonTest, Module, TestAttempt};
use crate::repositories;
use crate::schemas::analytics::{
    AnalyticsSummary, ContentAnalyticsResponse, ContentHighlight, ContentKind, Difficulty,
    LessonAnalytics, ModuleAnalytics, TestAnalytics,
};
use crate::services::attempts;
use crate::services::progress_report::share;

pub(crate) struct AnalyticsInputs<'a> {
    pub(crate) modules: &'a [Module],
    pub(crate) lessons: &'a [Lesson],
    pub(crate) tests: &'a [LessonTest],
    pub(crate) attempts: &'a [TestAttempt],
    pub(crate) total_students: usize,
    pub(crate) finished_lessons: &'a HashMap<String, usize>,
    pub(crate) finished_modules: &'a HashMap<String, usize>,
}

pub(crate) async fn course_analytics(
    pool: &PgPool,
    course: &Course,
) -> Result<ContentAnalyticsResponse, sqlx::Error> {
    let total_students = repositories::participations::count_for_course(pool, &course.id).await?;
    let total_students = usize::try_from(total_students).unwrap_or(0);
    if total_students == 0 {
        return Ok(ContentAnalyticsResponse {
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            total_students: 0,
            modules: Vec::new(),
            summary: AnalyticsSummary::default(),
        });
    }

    let modules = repositories::modules::list_for_course(pool, &course.id).await?;
    let lessons = repositories::lessons::list_for_course(pool, &course.id).await?;
    let tests = repositories::lesson_tests::list_for_course(pool, &course.id).await?;
    let attempts = repositories::analytics::participant_attempts(pool, &course.id).await?;
    let finished_lessons =
        counts_by_id(repositories::analytics::finished_lesson_counts(pool, &course.id).await?);
    let finished_modules =
        counts_by_id(repositories::analytics::finished_module_counts(pool, &course.id).await?);

    let inputs = AnalyticsInputs {
        modules: &modules,
        lessons: &lessons,
        tests: &tests,
        attempts: &attempts,
        total_students,
        finished_lessons: &finished_lessons,
        finished_modules: &finished_modules,
    };
    Ok(build(course, &inputs))
}

fn counts_by_id(rows: Vec<(String, i64)>) -> HashMap<String, usize> {
    rows.into_iter()
        .map(|(id, count)| (id, usize::try_from(count).unwrap_or(0)))
        .collect()
}

pub(crate) fn build(course: &Course, inputs: &AnalyticsInputs<'_>) -> ContentAnalyticsResponse {
    let students = inputs.total_students;

    let modules: Vec<ModuleAnalytics> = inputs
        .modules
        .iter()
        .map(|module| {
            let lessons: Vec<LessonAnalytics> = inputs
                .lessons
                .iter()
                .filter(|lesson| lesson.module_id == module.id)
                .map(|lesson| {
                    let tests: Vec<TestAnalytics> = inputs
                        .tests
                        .iter()
                        .filter(|test| test.lesson_id == lesson.id)
                        .map(|test| analyze_test(test, &lesson.title, inputs.attempts, students))
                        .collect();
                    let completed = inputs.finished_lessons.get(&lesson.id).copied().unwrap_or(0);
                    LessonAnalytics {
                        lesson_id: lesson.id.clone(),
                        title: lesson.title.clone(),
                        order_index: lesson.order_index,
                        students_completed: completed,
                        completion_rate: rounded(share(completed, students)),
                        avg_test_score: mean(tests.iter().map(|test| test.avg_score)),
                        has_tests: !tests.is_empty(),
                        tests,
                    }
                })
                .collect();

            let completed = inputs.finished_modules.get(&module.id).copied().unwrap_or(0);
            let module_tests = lessons.iter().flat_map(|lesson| lesson.tests.iter());
            ModuleAnalytics {
                module_id: module.id.clone(),
                title: module.title.clone(),
                order_index: module.order_index,
                students_completed: completed,
                completion_rate: rounded(share(completed, students)),
                avg_lesson_completion: mean(lessons.iter().map(|lesson| lesson.completion_rate)),
                avg_test_score: mean(module_tests.clone().map(|test| test.avg_score)),
                total_tests: module_tests.count(),
                lessons,
            }
        })
        .collect();

    let summary = summarize(&modules);
    ContentAnalyticsResponse {
        course_id: course.id.clone(),
        course_title: course.title.clone(),
        total_students: students,
        modules,
        summary,
    }
}

fn analyze_test(
    test: &LessonTest,
    title: &str,
    attempts: &[TestAttempt],
    total_students: usize,
) -> TestAnalytics {
    let mut per_user: HashMap<&str, Vec<&TestAttempt>> = HashMap::new();
    let mut total_attempts = 0usize;
    for attempt in attempts.iter().filter(|attempt| attempt.test_id == test.id) {
        total_attempts += 1;
        per_user.entry(attempt.user_id.as_str()).or_default().push(attempt);
    }

    let mut completed = 0usize;
    let mut passed = 0usize;
    let mut score_sum = 0.0;
    for user_attempts in per_user.values() {
        let best = user_attempts.iter().copied().filter(|attempt| attempt.completed).fold(
            None::<&TestAttempt>,
            |best, current| match best {
                Some(best) if best.score >= current.score => Some(best),
                _ => Some(current),
            },
        );
        let Some(best) = best else {
            continue;
        };
        completed += 1;
        if best.total_questions > 0 {
            score_sum += f64::from(best.score) / f64::from(best.total_questions) * 100.0;
            if attempts::passed(best.score, best.total_questions) {
                passed += 1;
            }
        }
    }

    let attempted = per_user.len();
    let completion_rate = share(completed, total_students);
    let avg_score = if completed > 0 { score_sum / completed as f64 } else { 0.0 };
    let avg_attempts =
        if attempted > 0 { total_attempts as f64 / attempted as f64 } else { 0.0 };

    TestAnalytics {
        test_id: test.id.clone(),
        title: title.to_string(),
        max_attempts: test.max_attempts,
        students_attempted: attempted,
        students_completed: completed,
        avg_score: rounded(avg_score),
        avg_attempts: (avg_attempts * 10.0).round() / 10.0,
        completion_rate: rounded(completion_rate),
        pass_rate: rounded(share(passed, completed)),
        difficulty: difficulty(completion_rate, avg_score),
    }
}

pub(crate) fn difficulty(completion_rate: f64, avg_score: f64) -> Difficulty {
    if completion_rate >= 80.0 && avg_score >= 80.0 {
        Difficulty::Easy
    } else if completion_rate <= 50.0 || avg_score <= 60.0 {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    }
}

fn summarize(modules: &[ModuleAnalytics]) -> AnalyticsSummary {
    let lessons: Vec<&LessonAnalytics> =
        modules.iter().flat_map(|module| module.lessons.iter()).collect();
    let tests: Vec<&TestAnalytics> = lessons.iter().flat_map(|lesson| lesson.tests.iter()).collect();

    let items: Vec<ContentHighlight> = modules
        .iter()
        .map(|module| {
            highlight(ContentKind::Module, &module.module_id, &module.title, module.completion_rate)
        })
        .chain(lessons.iter().map(|lesson| {
            highlight(ContentKind::Lesson, &lesson.lesson_id, &lesson.title, lesson.completion_rate)
        }))
        .chain(tests.iter().map(|test| {
            highlight(ContentKind::Test, &test.test_id, &test.title, test.completion_rate)
        }))
        .collect();

    // First item wins ties in both directions.
    let most_difficult = items.iter().fold(None::<&ContentHighlight>, |lowest, item| match lowest {
        Some(lowest) if lowest.completion_rate <= item.completion_rate => Some(lowest),
        _ => Some(item),
    });
    let easiest = items.iter().fold(None::<&ContentHighlight>, |highest, item| match highest {
        Some(highest) if highest.completion_rate >= item.completion_rate => Some(highest),
        _ => Some(item),
    });

    AnalyticsSummary {
        total_modules: modules.len(),
        total_lessons: lessons.len(),
        total_tests: tests.len(),
        avg_module_completion: mean(modules.iter().map(|module| module.completion_rate)),
        avg_lesson_completion: mean(lessons.iter().map(|lesson| lesson.completion_rate)),
        avg_test_completion: mean(tests.iter().map(|test| test.completion_rate)),
        avg_test_score: mean(tests.iter().map(|test| test.avg_score)),
        most_difficult_content: most_difficult.cloned(),
        easiest_content: easiest.cloned(),
    }
}

fn highlight(kind: ContentKind, id: &str, title: &str, completion_rate: i64) -> ContentHighlight {
    ContentHighlight { kind, id: id.to_string(), title: title.to_string(), completion_rate }
}

fn rounded(value: f64) -> i64 {
    value.round() as i64
}

/// Rounded mean; 0 for no values.
fn mean(values: impl Iterator<Item = i64>) -> i64 {
    let (sum, count) = values.fold((0i64, 0i64), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0
    } else {
        rounded(sum as f64 / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use time::macros::datetime;

    use super::{build, difficulty, AnalyticsInputs};
    use crate::db::models::{Course, Lesson, LessonTest, Module, TestAttempt};
    use crate::schemas::analytics::{ContentKind, Difficulty};

    fn course() -> Course {
        Course {
            id: "course".to_string(),
            title: "Rust".to_string(),
            description: String::new(),
            image: None,
            category_id: "cat".to_string(),
            creator_id: "author".to_string(),
            created_at: datetime!(2025-01-01 00:00:00),
            updated_at: datetime!(2025-01-01 00:00:00),
        }
    }

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

    fn quiz(id: &str, lesson_id: &str) -> LessonTest {
        LessonTest {
            id: id.to_string(),
            lesson_id: lesson_id.to_string(),
            max_attempts: 0,
            created_at: datetime!(2025-01-01 00:00:00),
        }
    }

    fn attempt(test_id: &str, user_id: &str, score: i32, completed: bool) -> TestAttempt {
        TestAttempt {
            id: format!("{test_id}-{user_id}-{score}"),
            test_id: test_id.to_string(),
            user_id: user_id.to_string(),
            score,
            total_questions: 5,
            completed,
            created_at: datetime!(2025-02-01 10:00:00),
            completed_at: None,
        }
    }

    fn counts(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(id, count)| (id.to_string(), *count)).collect()
    }

    #[test]
    fn rates_are_shares_of_enrolled_students() {
        let modules = vec![module("m1", 0), module("m2", 1)];
        let lessons = vec![lesson("l1", "m1"), lesson("l2", "m1"), lesson("l3", "m2")];
        let finished_lessons = counts(&[("l1", 4), ("l2", 2), ("l3", 1)]);
        let finished_modules = counts(&[("m1", 2)]);

        let report = build(
            &course(),
            &AnalyticsInputs {
                modules: &modules,
                lessons: &lessons,
                tests: &[],
                attempts: &[],
                total_students: 4,
                finished_lessons: &finished_lessons,
                finished_modules: &finished_modules,
            },
        );

        assert_eq!(report.total_students, 4);
        assert_eq!(report.modules[0].completion_rate, 50);
        assert_eq!(report.modules[0].lessons[0].completion_rate, 100);
        assert_eq!(report.modules[0].lessons[1].completion_rate, 50);
        assert_eq!(report.modules[0].avg_lesson_completion, 75);
        assert_eq!(report.modules[1].completion_rate, 0);
        assert_eq!(report.modules[1].lessons[0].completion_rate, 25);

        let summary = &report.summary;
        assert_eq!((summary.total_modules, summary.total_lessons, summary.total_tests), (2, 3, 0));
        assert_eq!(summary.avg_module_completion, 25);
        assert_eq!(summary.avg_lesson_completion, 58);
        let hardest = summary.most_difficult_content.as_ref().expect("hardest");
        assert_eq!((hardest.kind, hardest.id.as_str()), (ContentKind::Module, "m2"));
        let easiest = summary.easiest_content.as_ref().expect("easiest");
        assert_eq!((easiest.kind, easiest.id.as_str()), (ContentKind::Lesson, "l1"));
    }

    #[test]
    fn test_figures_use_each_students_best_completed_attempt() {
        let modules = vec![module("m1", 0)];
        let lessons = vec![lesson("l1", "m1")];
        let tests = vec![quiz("q1", "l1")];
        let attempts = vec![
            attempt("q1", "ann", 2, true),
            attempt("q1", "ann", 5, true),
            attempt("q1", "bob", 1, true),
            attempt("q1", "cid", 0, false),
            attempt("other", "ann", 5, true),
        ];
        let none = HashMap::new();

        let report = build(
            &course(),
            &AnalyticsInputs {
                modules: &modules,
                lessons: &lessons,
                tests: &tests,
                attempts: &attempts,
                total_students: 4,
                finished_lessons: &none,
                finished_modules: &none,
            },
        );

        let test = &report.modules[0].lessons[0].tests[0];
        assert_eq!(test.title, "Lesson l1");
        assert_eq!(test.students_attempted, 3);
        assert_eq!(test.students_completed, 2);
        assert_eq!(test.avg_score, 60);
        assert_eq!(test.avg_attempts, 1.3);
        assert_eq!(test.completion_rate, 50);
        assert_eq!(test.pass_rate, 50);
        assert_eq!(test.difficulty, Difficulty::Hard);
        assert!(report.modules[0].lessons[0].has_tests);
        assert_eq!(report.modules[0].lessons[0].avg_test_score, 60);
        assert_eq!(report.modules[0].total_tests, 1);
        assert_eq!(report.summary.avg_test_score, 60);
        assert_eq!(report.summary.avg_test_completion, 50);
    }

    #[test]
    fn course_without_content_has_no_highlights() {
        let none = HashMap::new();
        let report = build(
            &course(),
            &AnalyticsInputs {
                modules: &[],
                lessons: &[],
                tests: &[],
                attempts: &[],
                total_students: 3,
                finished_lessons: &none,
                finished_modules: &none,
            },
        );
        assert!(report.modules.is_empty());
        assert!(report.summary.most_difficult_content.is_none());
        assert!(report.summary.easiest_content.is_none());
    }

    #[test]
    fn difficulty_thresholds() {
        assert_eq!(difficulty(80.0, 80.0), Difficulty::Easy);
        assert_eq!(difficulty(90.0, 79.0), Difficulty::Medium);
        assert_eq!(difficulty(50.0, 95.0), Difficulty::Hard);
        assert_eq!(difficulty(70.0, 60.0), Difficulty::Hard);
        assert_eq!(difficulty(70.0, 70.0), Difficulty::Medium);
    }
}
