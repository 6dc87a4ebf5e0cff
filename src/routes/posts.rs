use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{CurrentUser, Principal};
use crate::errors::{AppError, AppResult};
use crate::models::comment::CommentView;
use crate::models::post::{
    Post, PostCreateRequest, PostDetail, PostDetailResponse, PostListQuery, PostListResponse, PostResponse,
    PostSummary, PostUpdateRequest, POST_COLUMNS,
};
use crate::utils::utc_now;
use crate::validation::{ValidatedJson, ValidatedPath, ValidatedQuery};

const SUMMARY_SELECT: &str = "SELECT p.id AS id, u.username AS author, p.title AS title, p.content AS content, \
     c.name AS course, p.created_at AS created_at \
     FROM posts p \
     LEFT JOIN users u ON u.id = p.user_id \
     LEFT JOIN courses c ON c.id = p.course_id";

#[utoipa::path(
    get,
    path = "/posts",
    tag = "Posts",
    params(PostListQuery),
    responses((status = 200, description = "Active posts, newest first", body = PostListResponse))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<PostListQuery>,
) -> AppResult<Json<PostListResponse>> {
    let course = query
        .course
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let sql = format!(
        "{SUMMARY_SELECT} WHERE p.status = 1 AND (? IS NULL OR c.name = ? COLLATE NOCASE) \
         ORDER BY p.created_at DESC"
    );
    let posts = sqlx::query_as::<_, PostSummary>(&sql)
        .bind(course)
        .bind(course)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(PostListResponse {
        success: true,
        total: posts.len(),
        posts,
    }))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailResponse),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(State(state): State<AppState>, ValidatedPath(id): ValidatedPath<Uuid>) -> AppResult<Json<PostDetailResponse>> {
    let sql = format!("{SUMMARY_SELECT} WHERE p.id = ? AND p.status = 1");
    let summary = sqlx::query_as::<_, PostSummary>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    let comments = sqlx::query_as::<_, CommentView>(
        "SELECT cm.id AS id, u.username AS author, cm.content AS content, cm.created_at AS created_at \
         FROM comments cm LEFT JOIN users u ON u.id = cm.user_id \
         WHERE cm.post_id = ? ORDER BY cm.created_at ASC",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(PostDetailResponse {
        success: true,
        post: PostDetail { summary, comments },
    }))
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "Posts",
    request_body = PostCreateRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<PostCreateRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let course_id = course_id_by_name(&state.pool, &payload.course_name).await?;

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query(
        "INSERT INTO posts (id, user_id, title, content, course_id, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(principal.id)
    .bind(payload.title.trim())
    .bind(&payload.content)
    .bind(course_id)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let post = fetch_post(&state.pool, id).await?;
    tracing::info!(post_id = %id, author = %principal.id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            message: "Post created".to_string(),
            post,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = PostUpdateRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Post or course not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<PostUpdateRequest>,
) -> AppResult<Json<PostResponse>> {
    let mut post = fetch_post(&state.pool, id).await?;
    ensure_author(&post, &principal)?;

    if let Some(title) = payload.title {
        post.title = title.trim().to_string();
    }
    if let Some(content) = payload.content {
        post.content = content;
    }
    if let Some(course_name) = payload.course_name.as_deref() {
        post.course_id = Some(course_id_by_name(&state.pool, course_name).await?);
    }

    let now = utc_now();
    sqlx::query("UPDATE posts SET title = ?, content = ?, course_id = ?, updated_at = ? WHERE id = ?")
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.course_id)
        .bind(now)
        .bind(id)
        .execute(&state.pool)
        .await?;

    post.updated_at = now;

    Ok(Json(PostResponse {
        success: true,
        message: "Post updated".to_string(),
        post,
    }))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "Posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deactivated", body = PostResponse),
        (status = 404, description = "Post not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_post(State(state): State<AppState>, ValidatedPath(id): ValidatedPath<Uuid>) -> AppResult<Json<PostResponse>> {
    let mut post = fetch_post(&state.pool, id).await?;

    let now = utc_now();
    let result = sqlx::query("UPDATE posts SET status = 0, updated_at = ? WHERE id = ? AND status = 1")
        .bind(now)
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("post not found"));
    }

    post.status = false;
    post.updated_at = now;
    tracing::info!(post_id = %id, "post deactivated");

    Ok(Json(PostResponse {
        success: true,
        message: "Post deleted".to_string(),
        post,
    }))
}

fn ensure_author(post: &Post, principal: &Principal) -> AppResult<()> {
    if post.user_id != principal.id {
        return Err(AppError::forbidden("only the author can modify this post"));
    }
    Ok(())
}

async fn course_id_by_name(pool: &SqlitePool, name: &str) -> AppResult<Uuid> {
    let name = name.trim();
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM courses WHERE name = ? COLLATE NOCASE AND status = 1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("course {name} not found")))
}

pub(crate) async fn fetch_post(pool: &SqlitePool, id: Uuid) -> AppResult<Post> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ? AND status = 1");
    sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("post not found"))
}
