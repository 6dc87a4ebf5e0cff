use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::routing::{get, patch, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{self, ADMIN_ONLY};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{auth, categories, comments, courses, health, posts, users};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
        }
    }
}

/// Builds the router with the signing key taken from the environment.
pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    Ok(build_router(AppState::new(pool, jwt_config)))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let authenticated = || middleware::from_fn_with_state(state.clone(), authz::authenticate);
    let admin_only = || middleware::from_fn(|req: Request, next: Next| authz::require_roles(ADMIN_ONLY, req, next));

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(Router::new().route("/me", get(auth::me)).route_layer(authenticated()));

    let user_routes = Router::new()
        .merge(
            Router::new()
                .route("/", get(users::list_users))
                .route_layer(admin_only()),
        )
        .route("/profile", put(users::update_profile))
        .route("/password", patch(users::update_password))
        .route_layer(authenticated());

    let category_routes = Router::new()
        .merge(
            Router::new()
                .route("/", post(categories::create_category))
                .route("/:id", put(categories::update_category).delete(categories::delete_category))
                .route_layer(admin_only())
                .route_layer(authenticated()),
        )
        .route("/", get(categories::list_categories))
        .route("/by-name/:name", get(categories::get_category_by_name));

    let course_routes = Router::new()
        .route("/", get(courses::list_courses))
        .route("/by-name/:name", get(courses::get_course_by_name));

    let post_routes = Router::new()
        .merge(
            Router::new()
                .route("/", post(posts::create_post))
                .route("/:id", put(posts::update_post).delete(posts::delete_post))
                .route_layer(admin_only())
                .route_layer(authenticated()),
        )
        .route("/", get(posts::list_posts))
        .route("/:id", get(posts::get_post));

    let comment_routes = Router::new()
        .route("/", post(comments::create_comment))
        .route("/:id", put(comments::update_comment).delete(comments::delete_comment))
        .route_layer(authenticated());

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/categories", category_routes)
        .nest("/courses", course_routes)
        .nest("/posts", post_routes)
        .nest("/comments", comment_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
