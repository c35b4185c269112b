use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::test_support;

async fn send(
    ctx: &test_support::TestContext,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("request");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

async fn get(
    ctx: &test_support::TestContext,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    send(ctx, Method::GET, uri, token, None).await
}

fn token_for(ctx: &test_support::TestContext, user: &User) -> String {
    test_support::bearer_token(&user.id, ctx.state.settings())
}

/// Starts, answers and completes one attempt through the API.
async fn take_test(
    ctx: &test_support::TestContext,
    token: &str,
    test_id: &str,
    question_id: &str,
    answer_id: &str,
) {
    let (status, started) =
        send(ctx, Method::POST, &format!("/api/v1/tests/{test_id}/start"), token, None).await;
    assert_eq!(status, StatusCode::CREATED, "response: {started}");
    let attempt_id = started["attemptId"].as_str().expect("attempt id").to_string();

    let (status, answered) = send(
        ctx,
        Method::POST,
        &format!("/api/v1/tests/attempts/{attempt_id}/answer"),
        token,
        Some(json!({ "questionId": question_id, "selectedAnswerId": answer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {answered}");

    let (status, completed) = send(
        ctx,
        Method::POST,
        &format!("/api/v1/tests/attempts/{attempt_id}/complete"),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {completed}");
}

async fn finish_lesson(ctx: &test_support::TestContext, token: &str, lesson_id: &str) {
    let (status, body) =
        send(ctx, Method::PUT, &format!("/api/v1/lessons/{lesson_id}/progress"), token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
}

async fn backdate_course(pool: &PgPool, course_id: &str, days: i32) {
    sqlx::query(
        "UPDATE courses SET created_at = created_at - make_interval(days => $1) WHERE id = $2",
    )
    .bind(days)
    .bind(course_id)
    .execute(pool)
    .await
    .expect("backdate course");
}

#[tokio::test]
async fn content_analytics_counts_only_enrolled_students() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();

    let teacher = test_support::insert_user(pool, "teacher41", UserRole::Teacher).await;
    let finisher = test_support::insert_user(pool, "student41", UserRole::Student).await;
    let idle = test_support::insert_user(pool, "student42", UserRole::Student).await;
    let visitor = test_support::insert_user(pool, "student43", UserRole::Student).await;

    let course = test_support::insert_course(pool, "Measured", &teacher.id).await;
    let module = test_support::insert_module(pool, &course.id, 0).await;
    let quiz_lesson = test_support::insert_lesson(pool, &module.id, 0).await;
    let reading = test_support::insert_lesson(pool, &module.id, 1).await;
    let test = test_support::insert_test(pool, &quiz_lesson.id, 0).await;
    let (question, right, _) = test_support::insert_question(pool, &test.id, "3 * 3?").await;
    test_support::enroll(pool, &finisher.id, &course.id).await;
    test_support::enroll(pool, &idle.id, &course.id).await;

    let finisher_token = token_for(&ctx, &finisher);
    take_test(&ctx, &finisher_token, &test.id, &question.id, &right.id).await;
    finish_lesson(&ctx, &finisher_token, &reading.id).await;
    take_test(&ctx, &token_for(&ctx, &visitor), &test.id, &question.id, &right.id).await;

    let uri = format!("/api/v1/courses/{}/content-analytics", course.id);
    let (status, report) = get(&ctx, &uri, &token_for(&ctx, &teacher)).await;
    assert_eq!(status, StatusCode::OK, "response: {report}");

    assert_eq!(report["courseTitle"], "Measured");
    assert_eq!(report["totalStudents"], 2);
    let module_view = &report["modules"][0];
    assert_eq!(module_view["studentsCompleted"], 1);
    assert_eq!(module_view["completionRate"], 50);
    assert_eq!(module_view["totalTests"], 1);
    assert_eq!(module_view["lessons"][0]["completionRate"], 50);
    assert_eq!(module_view["lessons"][0]["hasTests"], true);
    assert_eq!(module_view["lessons"][1]["hasTests"], false);

    let test_view = &module_view["lessons"][0]["tests"][0];
    assert_eq!(test_view["studentsAttempted"], 1);
    assert_eq!(test_view["studentsCompleted"], 1);
    assert_eq!(test_view["avgScore"], 100);
    assert_eq!(test_view["passRate"], 100);
    assert_eq!(test_view["completionRate"], 50);
    assert_eq!(test_view["difficulty"], "hard");

    assert_eq!(report["summary"]["totalLessons"], 2);
    assert_eq!(report["summary"]["avgTestScore"], 100);
    assert_eq!(report["summary"]["mostDifficultContent"]["type"], "module");

    let (status, _) = get(&ctx, &uri, &finisher_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let stranger = test_support::insert_user(pool, "teacher42", UserRole::Teacher).await;
    let (status, _) = get(&ctx, &uri, &token_for(&ctx, &stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn content_analytics_without_students_is_empty() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();

    let teacher = test_support::insert_user(pool, "teacher43", UserRole::Teacher).await;
    let course = test_support::insert_course(pool, "Unvisited", &teacher.id).await;
    test_support::insert_module(pool, &course.id, 0).await;

    let (status, report) = get(
        &ctx,
        &format!("/api/v1/courses/{}/content-analytics", course.id),
        &token_for(&ctx, &teacher),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {report}");
    assert_eq!(report["totalStudents"], 0);
    assert_eq!(report["modules"], json!([]));
    assert_eq!(report["summary"]["totalModules"], 0);
    assert!(report["summary"]["mostDifficultContent"].is_null());
}

#[tokio::test]
async fn learner_and_teacher_dashboards() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();

    let teacher = test_support::insert_user(pool, "teacher44", UserRole::Teacher).await;
    let student = test_support::insert_user(pool, "student44", UserRole::Student).await;
    let admin = test_support::insert_user(pool, "admin41", UserRole::Admin).await;

    let finished = test_support::insert_course(pool, "Done", &teacher.id).await;
    let module = test_support::insert_module(pool, &finished.id, 0).await;
    let lesson = test_support::insert_lesson(pool, &module.id, 0).await;
    let ongoing = test_support::insert_course(pool, "Going", &teacher.id).await;
    test_support::insert_module(pool, &ongoing.id, 0).await;
    test_support::enroll(pool, &student.id, &finished.id).await;
    test_support::enroll(pool, &student.id, &ongoing.id).await;

    let student_token = token_for(&ctx, &student);
    finish_lesson(&ctx, &student_token, &lesson.id).await;

    let (status, stats) =
        get(&ctx, &format!("/api/v1/users/{}/stats", student.id), &student_token).await;
    assert_eq!(status, StatusCode::OK, "response: {stats}");
    assert_eq!(stats["enrolledCourses"], 2);
    assert_eq!(stats["activeCourses"], 1);
    assert_eq!(stats["completedCourses"], 1);
    assert_eq!(stats["instructors"], 1);

    let (status, instructors) =
        get(&ctx, &format!("/api/v1/users/{}/instructors", student.id), &student_token).await;
    assert_eq!(status, StatusCode::OK, "response: {instructors}");
    assert_eq!(instructors["total"], 1);
    assert_eq!(instructors["instructors"][0]["id"], teacher.id.as_str());
    assert_eq!(instructors["instructors"][0]["coursesCount"], 2);

    let dashboard_uri = format!("/api/v1/users/{}/dashboard-stats", teacher.id);
    let (status, dashboard) = get(&ctx, &dashboard_uri, &token_for(&ctx, &teacher)).await;
    assert_eq!(status, StatusCode::OK, "response: {dashboard}");
    assert_eq!(dashboard["studentsCount"], 2);
    assert_eq!(dashboard["coursesCount"], 2);
    assert_eq!(dashboard["finishedParticipations"], 1);

    let (status, _) = get(&ctx, &dashboard_uri, &student_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = token_for(&ctx, &admin);
    let (status, _) = get(&ctx, &dashboard_uri, &admin_token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&ctx, "/api/v1/users/missing/stats", &admin_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn showcase_lists_rank_courses_categories_and_instructors() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();

    let busy_author = test_support::insert_user(pool, "teacher45", UserRole::Teacher).await;
    let calm_author = test_support::insert_user(pool, "teacher46", UserRole::Teacher).await;
    test_support::insert_user(pool, "teacher47", UserRole::Teacher).await;
    let viewer = test_support::insert_user(pool, "student45", UserRole::Student).await;
    let other = test_support::insert_user(pool, "student46", UserRole::Student).await;

    let busy = test_support::insert_course(pool, "Busy", &busy_author.id).await;
    let quiet = test_support::insert_course(pool, "Quiet", &busy_author.id).await;
    let middle = test_support::insert_course(pool, "Middle", &calm_author.id).await;
    backdate_course(pool, &busy.id, 3).await;
    backdate_course(pool, &quiet.id, 2).await;
    backdate_course(pool, &middle.id, 1).await;
    test_support::enroll(pool, &viewer.id, &busy.id).await;
    test_support::enroll(pool, &other.id, &busy.id).await;
    test_support::enroll(pool, &viewer.id, &middle.id).await;
    test_support::insert_category(pool, "Zoology").await;

    let viewer_token = token_for(&ctx, &viewer);

    let (status, popular) = get(&ctx, "/api/v1/courses/popular", &viewer_token).await;
    assert_eq!(status, StatusCode::OK, "response: {popular}");
    let titles: Vec<&str> = popular["courses"]
        .as_array()
        .expect("courses")
        .iter()
        .filter_map(|course| course["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Busy", "Middle", "Quiet"]);
    assert_eq!(popular["courses"][0]["students"], 2);
    assert_eq!(popular["courses"][0]["creatorName"], "teacher45 Tester");
    assert_eq!(popular["courses"][0]["categoryName"], "Busy category");

    let (status, recent) = get(&ctx, "/api/v1/courses/recent", &viewer_token).await;
    assert_eq!(status, StatusCode::OK, "response: {recent}");
    assert_eq!(recent["total"], 3);
    assert_eq!(recent["courses"][0]["title"], "Middle");
    assert_eq!(recent["courses"][2]["title"], "Busy");

    let (status, categories) = get(&ctx, "/api/v1/categories/stats", &viewer_token).await;
    assert_eq!(status, StatusCode::OK, "response: {categories}");
    assert_eq!(categories["total"], 4);
    assert_eq!(categories["categories"][0]["name"], "Busy category");
    assert_eq!(categories["categories"][0]["count"], 1);
    assert_eq!(categories["categories"][3]["name"], "Zoology");
    assert_eq!(categories["categories"][3]["count"], 0);

    let (status, top) = get(&ctx, "/api/v1/users/top-instructors", &viewer_token).await;
    assert_eq!(status, StatusCode::OK, "response: {top}");
    assert_eq!(top["total"], 2);
    assert_eq!(top["instructors"][0]["id"], busy_author.id.as_str());
    assert_eq!(top["instructors"][0]["studentsCount"], 2);
    assert_eq!(top["instructors"][0]["coursesCount"], 2);
    assert_eq!(top["instructors"][1]["studentsCount"], 1);
}
