use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::CurrentUser;
use crate::errors::{AppError, AppResult};
use crate::models::category::{
    Category, CategoryListResponse, CategoryRequest, CategoryResponse, CategorySummary, CATEGORY_COLUMNS,
};
use crate::models::PageQuery;
use crate::utils::{page_bounds, utc_now};
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    params(PageQuery),
    responses((status = 200, description = "Active categories", body = CategoryListResponse))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    ValidatedQuery(page): ValidatedQuery<PageQuery>,
) -> AppResult<Json<CategoryListResponse>> {
    let (limit, offset) = page_bounds(page.limit, page.offset);

    let categories = sqlx::query_as::<_, CategorySummary>(
        "SELECT c.id AS id, c.name AS name, u.name AS created_by \
         FROM categories c LEFT JOIN users u ON u.id = c.created_by \
         WHERE c.status = 1 ORDER BY c.created_at ASC, c.name ASC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(CategoryListResponse {
        success: true,
        categories,
    }))
}

#[utoipa::path(
    get,
    path = "/categories/by-name/{name}",
    tag = "Categories",
    params(("name" = String, Path, description = "Category name, case-insensitive")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category_by_name(
    State(state): State<AppState>,
    ValidatedPath(name): ValidatedPath<String>,
) -> AppResult<Json<CategoryResponse>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ? COLLATE NOCASE AND status = 1");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(name.trim())
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("category not found"))?;

    Ok(Json(CategoryResponse {
        success: true,
        message: None,
        category,
    }))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 409, description = "Category already exists")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let name = normalize_name(&payload.name)?;
    ensure_name_available(&state.pool, &name, None).await?;

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO categories (id, name, status, is_default, created_by, created_at, updated_at) VALUES (?, ?, 1, 0, ?, ?, ?)",
    )
    .bind(id)
    .bind(&name)
    .bind(principal.id)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await
    .map_err(conflict_on_unique)?;

    let category = fetch_category(&state.pool, id).await?;
    tracing::info!(category_id = %id, name = %category.name, "category created");

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            success: true,
            message: Some("Category created".to_string()),
            category,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category name already exists")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_category(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> AppResult<Json<CategoryResponse>> {
    let mut category = fetch_category(&state.pool, id).await?;
    let name = normalize_name(&payload.name)?;
    ensure_name_available(&state.pool, &name, Some(id)).await?;

    let now = utc_now();
    sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&name)
        .bind(now)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(conflict_on_unique)?;

    category.name = name;
    category.updated_at = now;

    Ok(Json(CategoryResponse {
        success: true,
        message: Some("Category updated".to_string()),
        category,
    }))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deactivated", body = CategoryResponse),
        (status = 400, description = "Default categories cannot be deleted"),
        (status = 404, description = "Category not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<CategoryResponse>> {
    let mut category = fetch_category(&state.pool, id).await?;

    if category.is_default {
        return Err(AppError::bad_request("default categories cannot be deleted"));
    }

    let now = utc_now();
    let affected = sqlx::query("UPDATE categories SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(now)
        .bind(id)
        .execute(&state.pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("category not found"));
    }

    category.status = false;
    category.updated_at = now;

    Ok(Json(CategoryResponse {
        success: true,
        message: Some("Category deactivated".to_string()),
        category,
    }))
}

fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    Ok(name)
}

async fn ensure_name_available(pool: &SqlitePool, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM categories WHERE name = ? COLLATE NOCASE AND (? IS NULL OR id <> ?)",
    )
    .bind(name)
    .bind(except)
    .bind(except)
    .fetch_one(pool)
    .await?;

    if count > 0 {
        return Err(AppError::conflict("category already exists"));
    }

    Ok(())
}

fn conflict_on_unique(err: sqlx::Error) -> AppError {
    match AppError::from(err) {
        err if err.is_unique_violation() => AppError::conflict("category already exists"),
        err => err,
    }
}

async fn fetch_category(pool: &SqlitePool, id: Uuid) -> AppResult<Category> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ? AND status = 1");
    sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("category not found"))
}
