use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::authz::CurrentUser;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::user::{
    DbUser, UpdatePasswordRequest, UpdateProfileRequest, User, UserListResponse, UserUpdatedResponse, USER_COLUMNS,
};
use crate::models::{MessageResponse, PageQuery};
use crate::utils::{hash_password, page_bounds, utc_now, verify_password};
use crate::validation::{ValidatedJson, ValidatedQuery};

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(PageQuery),
    responses(
        (status = 200, description = "Registered users", body = UserListResponse),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(page): ValidatedQuery<PageQuery>,
) -> AppResult<Json<UserListResponse>> {
    let (limit, offset) = page_bounds(page.limit, page.offset);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC LIMIT ? OFFSET ?");
    let users = sqlx::query_as::<_, DbUser>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(UserListResponse {
        success: true,
        total,
        users,
    }))
}

#[utoipa::path(
    put,
    path = "/users/profile",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserUpdatedResponse),
        (status = 409, description = "Email or username already in use")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserUpdatedResponse>> {
    let mut user = db::users::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or(AppError::PrincipalNotFound)?;

    if let Some(username) = payload.username.as_deref() {
        if username != user.username && db::users::username_taken(&state.pool, username, Some(user.id)).await? {
            return Err(AppError::conflict(format!("the username {username} is already registered")));
        }
        user.username = username.to_string();
    }
    if let Some(email) = payload.email.as_deref().map(str::to_lowercase) {
        if email != user.email && db::users::email_taken(&state.pool, &email, Some(user.id)).await? {
            return Err(AppError::conflict(format!("the email {email} is already registered")));
        }
        user.email = email;
    }
    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(surname) = payload.surname {
        user.surname = surname;
    }
    if let Some(phone) = payload.phone {
        user.phone = phone;
    }
    if payload.profile_picture.is_some() {
        user.profile_picture = payload.profile_picture;
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE users SET name = ?, surname = ?, username = ?, email = ?, phone = ?, profile_picture = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&user.name)
    .bind(&user.surname)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(&user.profile_picture)
    .bind(now)
    .bind(user.id)
    .execute(&state.pool)
    .await
    .map_err(|err| match AppError::from(err) {
        err if err.is_unique_violation() => AppError::conflict("email or username already registered"),
        err => err,
    })?;

    user.updated_at = now;
    let user: User = user.try_into()?;

    Ok(Json(UserUpdatedResponse {
        success: true,
        message: "Profile updated".to_string(),
        user,
    }))
}

#[utoipa::path(
    patch,
    path = "/users/password",
    tag = "Users",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Current password is wrong")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = db::users::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or(AppError::PrincipalNotFound)?;

    if !verify_password(&payload.current_password, &user.password_hash) {
        return Err(AppError::bad_request("current password is incorrect"));
    }

    let password_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(utc_now())
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = %user.id, "password updated");

    Ok(Json(MessageResponse::ok("Password updated")))
}
