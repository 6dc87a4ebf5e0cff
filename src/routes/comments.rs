use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::CurrentUser;
use crate::errors::{AppError, AppResult};
use crate::models::comment::{Comment, CommentCreateRequest, CommentResponse, CommentUpdateRequest, COMMENT_COLUMNS};
use crate::routes::posts::fetch_post;
use crate::utils::utc_now;
use crate::validation::{ValidatedJson, ValidatedPath};

#[utoipa::path(
    post,
    path = "/comments",
    tag = "Comments",
    request_body = CommentCreateRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 404, description = "Post not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CommentCreateRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    // comments only attach to live posts
    let post = fetch_post(&state.pool, payload.post_id).await?;

    let id = Uuid::new_v4();
    let now = utc_now();
    sqlx::query(
        "INSERT INTO comments (id, post_id, user_id, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(post.id)
    .bind(principal.id)
    .bind(payload.content.trim())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let comment = fetch_comment(&state.pool, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            success: true,
            message: "Comment created".to_string(),
            comment,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/comments/{id}",
    tag = "Comments",
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = CommentUpdateRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CommentUpdateRequest>,
) -> AppResult<Json<CommentResponse>> {
    let mut comment = fetch_comment(&state.pool, id).await?;

    if comment.user_id != principal.id {
        return Err(AppError::forbidden("only the author can edit this comment"));
    }

    let now = utc_now();
    let content = payload.content.trim().to_string();
    sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
        .bind(&content)
        .bind(now)
        .bind(id)
        .execute(&state.pool)
        .await?;

    comment.content = content;
    comment.updated_at = now;

    Ok(Json(CommentResponse {
        success: true,
        message: "Comment updated".to_string(),
        comment,
    }))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "Comments",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = CommentResponse),
        (status = 403, description = "Caller is neither the author nor an administrator"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<CommentResponse>> {
    let comment = fetch_comment(&state.pool, id).await?;

    if comment.user_id != principal.id && !principal.is_admin() {
        return Err(AppError::forbidden("only the author or an administrator can delete this comment"));
    }

    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    tracing::info!(comment_id = %id, deleted_by = %principal.id, "comment deleted");

    Ok(Json(CommentResponse {
        success: true,
        message: "Comment deleted".to_string(),
        comment,
    }))
}

async fn fetch_comment(pool: &SqlitePool, id: Uuid) -> AppResult<Comment> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?");
    sqlx::query_as::<_, Comment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("comment not found"))
}
