use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::course::{Course, CourseListResponse, CourseResponse, CourseSummary, COURSE_COLUMNS};
use crate::models::PageQuery;
use crate::utils::page_bounds;
use crate::validation::{ValidatedPath, ValidatedQuery};

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(PageQuery),
    responses((status = 200, description = "Active courses", body = CourseListResponse))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    ValidatedQuery(page): ValidatedQuery<PageQuery>,
) -> AppResult<Json<CourseListResponse>> {
    let (limit, offset) = page_bounds(page.limit, page.offset);

    let courses = sqlx::query_as::<_, CourseSummary>(
        "SELECT id, name FROM courses WHERE status = 1 ORDER BY created_at ASC, name ASC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(CourseListResponse { success: true, courses }))
}

#[utoipa::path(
    get,
    path = "/courses/by-name/{name}",
    tag = "Courses",
    params(("name" = String, Path, description = "Course name, case-insensitive")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_by_name(
    State(state): State<AppState>,
    ValidatedPath(name): ValidatedPath<String>,
) -> AppResult<Json<CourseResponse>> {
    let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE name = ? COLLATE NOCASE AND status = 1");
    let course = sqlx::query_as::<_, Course>(&sql)
        .bind(name.trim())
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("course {} not found", name.trim())))?;

    Ok(Json(CourseResponse { success: true, course }))
}
