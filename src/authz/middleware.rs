use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::principal::{Principal, Role};
use crate::app::AppState;
use crate::db;
use crate::errors::AppError;
use crate::models::user::User;

/// Routes gated with this set accept administrators only.
pub const ADMIN_ONLY: &[Role] = &[Role::AdminRole];

/// Pulls the session token out of `Authorization`. `Bearer <token>` is the
/// documented form; a bare token is tolerated.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::invalid_token("authorization header is not valid ASCII"))?
        .trim();

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err(AppError::invalid_token("unsupported authorization scheme")),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        None => raw,
    };

    if token.is_empty() {
        return Err(AppError::MissingToken);
    }

    Ok(token)
}

/// Verifies the session token, loads its principal and attaches it to the
/// request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = bearer_token(req.headers())?;
        state.jwt.decode(token)?
    };

    let db_user = db::users::find_by_id(&state.pool, claims.sub)
        .await?
        .filter(|user| user.status)
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "token subject missing or inactive");
            AppError::PrincipalNotFound
        })?;

    let user: User = db_user.try_into()?;
    req.extensions_mut().insert(Principal::from(user));

    Ok(next.run(req).await)
}

/// Must run inside [`authenticate`]; a request without an attached principal is
/// rejected rather than let through.
pub async fn require_roles(allowed: &'static [Role], req: Request, next: Next) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(AppError::PrincipalNotFound)?;

    if !principal.has_any_role(allowed) {
        tracing::info!(
            user_id = %principal.id,
            role = %principal.role,
            "role check failed"
        );
        return Err(AppError::forbidden("insufficient role for this resource"));
    }

    Ok(next.run(req).await)
}

/// Handler-side access to the principal attached by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::PrincipalNotFound)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            name: "Test".to_string(),
            surname: "User".to_string(),
            role,
            profile_picture: None,
        }
    }

    fn gated(attached: Option<Principal>) -> Router {
        let router = Router::new()
            .route("/", get(|| async { "reached" }))
            .route_layer(middleware::from_fn(|req: Request, next: Next| {
                require_roles(ADMIN_ONLY, req, next)
            }));

        match attached {
            Some(p) => router.layer(middleware::from_fn(move |mut req: Request, next: Next| {
                req.extensions_mut().insert(p.clone());
                next.run(req)
            })),
            None => router,
        }
    }

    async fn status_of(router: Router) -> StatusCode {
        let req = axum::http::Request::builder().uri("/").body(Body::empty()).unwrap();
        router.oneshot(req).await.unwrap().status()
    }

    #[test]
    fn bearer_token_forms() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::MissingToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(AppError::MissingToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_token(&headers), Err(AppError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn role_gate_without_principal_rejects() {
        assert_eq!(status_of(gated(None)).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn role_gate_forbids_other_roles() {
        assert_eq!(status_of(gated(Some(principal(Role::UserRole)))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn role_gate_admits_allowed_role() {
        assert_eq!(status_of(gated(Some(principal(Role::AdminRole)))).await, StatusCode::OK);
    }
}
