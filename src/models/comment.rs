use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, created_at, updated_at";

/// Comment under a post, with the author's username.
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub author: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentCreateRequest {
    pub post_id: Uuid,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "Great write-up!")]
    #[validate(length(min = 1, max = 2000, message = "content must be between 1 and 2000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentUpdateRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[validate(length(min = 1, max = 2000, message = "content must be between 1 and 2000 characters"))]
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub success: bool,
    pub message: String,
    pub comment: Comment,
}
