use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::comment::CommentView;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub course_id: Option<Uuid>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const POST_COLUMNS: &str = "id, user_id, title, content, course_id, status, created_at, updated_at";

/// Post as shown to readers: author and course names instead of ids.
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct PostSummary {
    pub id: Uuid,
    pub author: Option<String>,
    pub title: String,
    pub content: String,
    pub course: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostCreateRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "Primer proyecto")]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "TECNOLOGIA")]
    #[validate(length(min = 1, message = "course_name is required"))]
    pub course_name: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "Notes from the first workshop.")]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostUpdateRequest {
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "course_name must not be empty"))]
    pub course_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Only posts attached to this course (case-insensitive).
    pub course: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub success: bool,
    pub message: String,
    pub post: Post,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostListResponse {
    pub success: bool,
    pub total: usize,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetailResponse {
    pub success: bool,
    pub post: PostDetail,
}
