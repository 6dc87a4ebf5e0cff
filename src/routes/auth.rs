use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::app::AppState;
use crate::authz::{CurrentUser, Role};
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserResponse};
use crate::utils::{hash_password, verify_password};
use crate::validation::ValidatedJson;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or username already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = payload.email.to_lowercase();
    let username = payload.username.as_str();

    if db::users::email_taken(&state.pool, &email, None).await? {
        return Err(AppError::conflict(format!("the email {email} is already registered")));
    }
    if db::users::username_taken(&state.pool, username, None).await? {
        return Err(AppError::conflict(format!("the username {username} is already registered")));
    }

    let password_hash = hash_password(&payload.password)?;

    let inserted = db::users::insert(
        &state.pool,
        db::users::NewUser {
            name: &payload.name,
            surname: &payload.surname,
            username,
            email: &email,
            password_hash: &password_hash,
            phone: &payload.phone,
            profile_picture: payload.profile_picture.as_deref(),
            role: Role::UserRole,
        },
    )
    .await;

    let user_id = match inserted {
        Ok(id) => id,
        Err(err) if err.is_unique_violation() => {
            return Err(AppError::conflict("email or username already registered"));
        }
        Err(err) => return Err(err),
    };

    tracing::info!(user_id = %user_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User has been created".to_string(),
            name: payload.name,
            email,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials"),
        (status = 500, description = "Server error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if email.is_none() && username.is_none() {
        return Err(AppError::validation("email or username is required"));
    }

    let db_user = db::users::find_by_login(&state.pool, email, username)
        .await?
        .filter(|user| user.status)
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &db_user.password_hash) {
        tracing::info!(user_id = %db_user.id, "login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.encode(db_user.id)?;
    tracing::info!(user_id = %db_user.id, "login succeeded");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        profile_picture: db_user.profile_picture,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(State(state): State<AppState>, CurrentUser(principal): CurrentUser) -> AppResult<Json<UserResponse>> {
    let db_user = db::users::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or(AppError::PrincipalNotFound)?;
    let user: User = db_user.try_into()?;

    Ok(Json(UserResponse { success: true, user }))
}
