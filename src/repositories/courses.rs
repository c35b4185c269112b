use sqlx::PgPool;

use crate::db::models::{Course, CourseSummary, EnrolledCourse};

const COLUMNS: &str =
    "id, title, description, image, category_id, creator_id, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) image: Option<&'a str>,
    pub(crate) category_id: &'a str,
    pub(crate) creator_id: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) category_id: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, image, category_id, creator_id, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.image)
    .bind(params.category_id)
    .bind(params.creator_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

/// Row lock held until the surrounding transaction ends; new enrollments wait on it.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    category_id: Option<&str>,
) -> Result<Vec<CourseSummary>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummary>(
        "SELECT c.id, c.title, c.description, c.image, c.category_id, c.creator_id, c.created_at,
                (SELECT COUNT(*) FROM modules m WHERE m.course_id = c.id) AS modules_count
         FROM courses c
         WHERE ($1::text IS NULL OR c.category_id = $1)
         ORDER BY c.created_at DESC, c.id",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            image = COALESCE($3, image),
            category_id = COALESCE($4, category_id),
            updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.image)
    .bind(params.category_id)
    .bind(params.updated_at)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_enrolled(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<EnrolledCourse>, sqlx::Error> {
    sqlx::query_as::<_, EnrolledCourse>(
        "SELECT c.id, c.title, c.description, c.image,
                p.created_at AS enrolled_at,
                COALESCE(cp.finished, FALSE) AS finished
         FROM course_participations p
         JOIN courses c ON c.id = p.course_id
         LEFT JOIN course_progress cp
           ON cp.participation_id = p.id AND cp.course_id = c.id
         WHERE p.user_id = $1
         ORDER BY p.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
