use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::authz::Role;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of `users`. Carries the password hash, so it never leaves the
/// crate as a response body.
#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub profile_picture: Option<String>,
    pub role: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const USER_COLUMNS: &str =
    "id, name, surname, username, email, password_hash, phone, profile_picture, role, status, created_at, updated_at";

impl TryFrom<DbUser> for User {
    type Error = AppError;

    fn try_from(value: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: value.id,
            role: value.role.parse()?,
            name: value.name,
            surname: value.surname,
            username: value.username,
            email: value.email,
            phone: value.phone,
            profile_picture: value.profile_picture,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "Ada")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "Lovelace")]
    #[validate(length(min = 1, message = "surname is required"))]
    pub surname: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "ada")]
    #[validate(length(min = 3, max = 32, message = "username must be between 3 and 32 characters"))]
    pub username: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "ada@example.com")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(deserialize_with = "crate::validation::trimmed")]
    #[schema(example = "21326554")]
    #[validate(length(min = 8, max = 15, message = "phone must be between 8 and 15 characters"))]
    pub phone: String,
    #[schema(example = "ada.png")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub name: String,
    pub email: String,
}

/// Either `email` or `username` identifies the account.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@spacesocial.com")]
    pub email: Option<String>,
    #[schema(example = "admin_role")]
    pub username: Option<String>,
    #[schema(example = "S3cureP@ssw0rd")]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub total: i64,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 3, max = 32, message = "username must be between 3 and 32 characters"))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::trimmed_opt")]
    #[validate(length(min = 8, max = 15, message = "phone must be between 8 and 15 characters"))]
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "current_password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters"))]
    pub new_password: String,
}
