use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const COURSE_COLUMNS: &str = "id, name, status, created_at, updated_at";

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub success: bool,
    pub course: Course,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseListResponse {
    pub success: bool,
    pub courses: Vec<CourseSummary>,
}
