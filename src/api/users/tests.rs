use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn me_returns_the_token_owner() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(ctx.state.db(), "student41", UserRole::Student).await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users/me", Some(&token), None))
        .await
        .expect("get me");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["username"], "student41");
    assert_eq!(body["role"], "student");
    assert_eq!(body["lastName"], "Tester");
}

#[tokio::test]
async fn me_requires_a_known_user() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::bearer_token("ghost", ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users/me", Some(&token), None))
        .await
        .expect("get me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users/me", None, None))
        .await
        .expect("get me without token");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn my_courses_and_wishlist_list_only_own_rows() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();

    let teacher = test_support::insert_user(pool, "teacher42", UserRole::Teacher).await;
    let student = test_support::insert_user(pool, "student42", UserRole::Student).await;
    let other = test_support::insert_user(pool, "student43", UserRole::Student).await;
    let enrolled = test_support::insert_course(pool, "Enrolled", &teacher.id).await;
    let wished = test_support::insert_course(pool, "Wished", &teacher.id).await;

    test_support::enroll(pool, &student.id, &enrolled.id).await;
    test_support::enroll(pool, &other.id, &wished.id).await;
    repositories::wishlist::add(pool, &student.id, &wished.id, primitive_now_utc())
        .await
        .expect("add to wishlist");

    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/me/courses",
            Some(&token),
            None,
        ))
        .await
        .expect("my courses");
    let status = response.status();
    let courses = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {courses}");
    assert_eq!(courses["total"], 1);
    assert_eq!(courses["courses"][0]["id"], enrolled.id.as_str());
    assert_eq!(courses["courses"][0]["finished"], false);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/users/me/wishlist",
            Some(&token),
            None,
        ))
        .await
        .expect("my wishlist");
    let status = response.status();
    let wishlist = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {wishlist}");
    assert_eq!(wishlist["total"], 1);
    assert_eq!(wishlist["courses"][0]["title"], "Wished");
}
