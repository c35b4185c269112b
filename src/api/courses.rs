use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{authorize, Capability, CurrentUser};
use crate::api::loaders;
use crate::api::validation::{require_text, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::is_foreign_key_violation;
use crate::repositories;
use crate::schemas::course::{
    CourseCreate, CourseDeleteQuery, CourseDetailResponse, CourseListQuery, CourseListResponse,
    CourseResponse, CourseSummaryResponse, CourseUpdate, ParticipationResponse,
    StudentProgressResponse, StudentsProgressResponse, WishlistEntryResponse,
};
use crate::schemas::lesson::LessonSummaryResponse;
use crate::schemas::module::{ModuleResponse, ModuleWithLessonsResponse};
use crate::schemas::progress::{CourseProgressResponse, ProgressQuery};
use crate::services::{course_removal, progress_report};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).patch(update_course).delete(delete_course))
        .route("/:course_id/participate", post(participate))
        .route("/:course_id/wishlist", post(add_to_wishlist).delete(remove_from_wishlist))
        .route("/:course_id/progress", get(course_progress))
        .route("/:course_id/students-progress", get(students_progress))
}

async fn list_courses(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<CourseListResponse>, ApiError> {
    let courses = repositories::courses::list(state.db(), query.category_id.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    let courses: Vec<CourseSummaryResponse> =
        courses.into_iter().map(CourseSummaryResponse::from_db).collect();
    Ok(Json(CourseListResponse { total: courses.len(), courses }))
}

async fn create_course(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    authorize(&user, Capability::Author, None)?;
    validate_payload(&payload)?;
    require_text(&payload.title, "title")?;

    repositories::categories::find_by_id(state.db(), &payload.category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: &payload.description,
            image: payload.image.as_deref(),
            category_id: &payload.category_id,
            creator_id: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let course = loaders::course(&state, &course_id).await?;

    let modules = repositories::modules::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list modules"))?;
    let lessons = repositories::lessons::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lessons"))?;

    let modules = modules
        .into_iter()
        .map(|module| {
            let lessons = lessons
                .iter()
                .filter(|lesson| lesson.module_id == module.id)
                .map(LessonSummaryResponse::from_db)
                .collect();
            ModuleWithLessonsResponse { module: ModuleResponse::from_db(module), lessons }
        })
        .collect();

    Ok(Json(CourseDetailResponse { course: CourseResponse::from_db(course), modules }))
}

async fn update_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = loaders::course(&state, &course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;
    validate_payload(&payload)?;

    if let Some(category_id) = payload.category_id.as_deref() {
        repositories::categories::find_by_id(state.db(), category_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    }

    let updated = repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            image: payload.image,
            category_id: payload.category_id,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?
    .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(CourseResponse::from_db(updated)))
}

async fn delete_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<CourseDeleteQuery>,
) -> Result<StatusCode, ApiError> {
    let course = loaders::course(&state, &course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let report = course_removal::remove_course(state.db(), &course_id, query.cascade).await?;

    tracing::info!(
        user_id = %user.id,
        action = "course_delete",
        course_id = %course_id,
        cascade = query.cascade,
        participations = report.rows_for("course_participations"),
        rows = report.total_rows(),
        "Course removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

async fn participate(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ParticipationResponse>, ApiError> {
    loaders::course(&state, &course_id).await?;

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start enrollment transaction"))?;

    let now = primitive_now_utc();
    let inserted = repositories::participations::insert_if_absent(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &user.id,
        &course_id,
        now,
    )
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            ApiError::NotFound("Course not found".to_string())
        } else {
            ApiError::internal(e, "Failed to enroll in course")
        }
    })?;

    let (participation, already_participating) = match inserted {
        Some(participation) => {
            repositories::progress::ensure_course_progress(
                &mut *tx,
                &participation.id,
                &course_id,
                now,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to seed course progress"))?;
            (participation, false)
        }
        None => {
            let existing = repositories::participations::find(&mut *tx, &user.id, &course_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch participation"))?
                .ok_or_else(|| {
                    ApiError::Conflict("Enrollment changed concurrently, retry".to_string())
                })?;
            (existing, true)
        }
    };

    let in_wishlist = repositories::wishlist::contains(&mut *tx, &user.id, &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check wishlist"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit enrollment"))?;

    if !already_participating {
        tracing::info!(user_id = %user.id, course_id = %course_id, "User enrolled in course");
    }

    Ok(Json(ParticipationResponse {
        participation_id: participation.id,
        course_id,
        already_participating,
        in_wishlist,
    }))
}

async fn add_to_wishlist(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<WishlistEntryResponse>, ApiError> {
    loaders::course(&state, &course_id).await?;

    repositories::wishlist::add(state.db(), &user.id, &course_id, primitive_now_utc())
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ApiError::NotFound("Course not found".to_string())
            } else {
                ApiError::internal(e, "Failed to add course to wishlist")
            }
        })?;

    Ok(Json(WishlistEntryResponse { course_id, in_wishlist: true }))
}

async fn remove_from_wishlist(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<WishlistEntryResponse>, ApiError> {
    repositories::wishlist::remove(state.db(), &user.id, &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove course from wishlist"))?;

    Ok(Json(WishlistEntryResponse { course_id, in_wishlist: false }))
}

async fn course_progress(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<CourseProgressResponse>, ApiError> {
    let course = loaders::course(&state, &course_id).await?;
    let target_user_id = query.user_id.unwrap_or_else(|| user.id.clone());

    authorize(&user, Capability::ReadOwn, Some(&target_user_id))
        .or_else(|_| authorize(&user, Capability::WriteOwn, Some(&course.creator_id)))?;

    let report = progress_report::course_report(state.db(), &course, &target_user_id).await?;
    Ok(Json(report))
}

async fn students_progress(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentsProgressResponse>, ApiError> {
    let course = loaders::course(&state, &course_id).await?;
    authorize(&user, Capability::WriteOwn, Some(&course.creator_id))?;

    let total_lessons = repositories::lessons::count_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count lessons"))?;
    let rows = repositories::participations::list_student_progress(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student progress"))?;

    let students: Vec<StudentProgressResponse> = rows
        .into_iter()
        .map(|row| StudentProgressResponse::from_db(row, total_lessons))
        .collect();

    Ok(Json(StudentsProgressResponse {
        course_id,
        course_title: course.title,
        total_lessons,
        total_students: students.len(),
        students,
    }))
}
