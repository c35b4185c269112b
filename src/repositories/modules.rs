use sqlx::PgPool;

use crate::db::models::Module;

const COLUMNS: &str = "id, course_id, title, description, order_index, created_at";

pub(crate) struct CreateModule<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) order_index: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateModule {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) order_index: Option<i32>,
}

pub(crate) async fn create(pool: &PgPool, params: CreateModule<'_>) -> Result<Module, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "INSERT INTO modules (id, course_id, title, description, order_index, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.order_index)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, module_id: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!("SELECT {COLUMNS} FROM modules WHERE id = $1"))
        .bind(module_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "SELECT {COLUMNS} FROM modules WHERE course_id = $1 ORDER BY order_index, created_at, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_course(
    executor: impl sqlx::PgExecutor<'_>,
    course_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM modules WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    module_id: &str,
    params: UpdateModule,
) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "UPDATE modules SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            order_index = COALESCE($3, order_index)
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.order_index)
    .bind(module_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, module_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM modules WHERE id = $1").bind(module_id).execute(pool).await?;
    Ok(result.rows_affected())
}
