use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub status: bool,
    pub is_default: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const CATEGORY_COLUMNS: &str = "id, name, status, is_default, created_by, created_at, updated_at";

/// List entry with the creator's display name resolved.
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "tecnologia")]
    #[validate(length(min = 1, max = 64, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub category: Category,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponse {
    pub success: bool,
    pub categories: Vec<CategorySummary>,
}
