use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;

use spacesocial::bootstrap::{self, AdminSeed};
use spacesocial::jwt::JwtConfig;
use spacesocial::{build_router, db, AppState};

struct Harness {
    _dir: TempDir,
    app: Router,
    admin: String,
    user: String,
}

async fn setup() -> Result<Harness> {
    let dir = tempdir()?;
    let url = format!("sqlite://{}", dir.path().join("content.db").display());
    let pool = db::init(&url).await?;
    bootstrap::run_startup(&pool, &AdminSeed::default()).await;

    let app = build_router(AppState::new(pool, JwtConfig::new("test-secret", 24)));

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "name": "Grace",
            "surname": "Hopper",
            "username": "grace",
            "email": "grace@example.com",
            "password": "password123",
            "phone": "55598765"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let admin = login(&app, "admin_role", "ADMIN25$ki").await?;
    let user = login(&app, "grace", "password123").await?;

    Ok(Harness { _dir: dir, app, admin, user })
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn login(app: &Router, username: &str, password: &str) -> Result<String> {
    let (status, v) = send(app, "POST", "/auth/login", None, Some(json!({"username": username, "password": password}))).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {}", v);
    Ok(v["token"].as_str().unwrap_or_default().to_string())
}

fn id_of(v: &Value, key: &str) -> String {
    v[key]["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn category_lifecycle() -> Result<()> {
    let h = setup().await?;

    let (status, v) = send(&h.app, "GET", "/categories", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["categories"].as_array().map(Vec::len), Some(3));
    assert_eq!(v["categories"][0]["created_by"], json!("Admin"));

    let (status, v) = send(&h.app, "POST", "/categories", Some(&h.admin), Some(json!({"name": "  Music "}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", v);
    assert_eq!(v["category"]["name"], json!("music"));
    let music = id_of(&v, "category");

    let (status, _) = send(&h.app, "POST", "/categories", Some(&h.admin), Some(json!({"name": "MUSIC"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, v) = send(&h.app, "GET", "/categories/by-name/Music", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["category"]["id"], json!(music));

    let (status, _) = send(&h.app, "PUT", &format!("/categories/{music}"), Some(&h.admin), Some(json!({"name": "sport"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, v) = send(&h.app, "PUT", &format!("/categories/{music}"), Some(&h.admin), Some(json!({"name": "Jazz"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["category"]["name"], json!("jazz"));

    let (status, v) = send(&h.app, "DELETE", &format!("/categories/{music}"), Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["category"]["status"], json!(false));

    let (status, _) = send(&h.app, "DELETE", &format!("/categories/{music}"), Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&h.app, "GET", "/categories/by-name/jazz", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, v) = send(&h.app, "GET", "/categories/by-name/sport", None, None).await?;
    let sport = id_of(&v, "category");
    let (status, v) = send(&h.app, "DELETE", &format!("/categories/{sport}"), Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], json!("bad_request"));

    Ok(())
}

#[tokio::test]
async fn courses_are_public() -> Result<()> {
    let h = setup().await?;

    let (status, v) = send(&h.app, "GET", "/courses", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["courses"].as_array().map(Vec::len), Some(3));

    let (status, v) = send(&h.app, "GET", "/courses/by-name/taller", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["course"]["name"], json!("TALLER"));

    let (status, _) = send(&h.app, "GET", "/courses/by-name/astronomy", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn posts_and_comments() -> Result<()> {
    let h = setup().await?;

    let (status, v) = send(&h.app, "GET", "/posts", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], json!(0));

    let post_body = json!({"title": "Primer proyecto", "course_name": "tecnologia", "content": "Workshop notes"});
    let (status, _) = send(&h.app, "POST", "/posts", Some(&h.user), Some(post_body.clone())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &h.app,
        "POST",
        "/posts",
        Some(&h.admin),
        Some(json!({"title": "x", "course_name": "astronomy", "content": "y"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, v) = send(&h.app, "POST", "/posts", Some(&h.admin), Some(post_body)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", v);
    let post = id_of(&v, "post");

    let (status, v) = send(&h.app, "GET", "/posts?course=TECNOLOGIA", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], json!(1));
    assert_eq!(v["posts"][0]["author"], json!("admin_role"));
    assert_eq!(v["posts"][0]["course"], json!("TECNOLOGIA"));

    let (_, v) = send(&h.app, "GET", "/posts?course=TALLER", None, None).await?;
    assert_eq!(v["total"], json!(0));

    let (status, v) = send(
        &h.app,
        "POST",
        "/comments",
        Some(&h.user),
        Some(json!({"post_id": post, "content": "Great write-up!"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", v);
    let comment = id_of(&v, "comment");

    let (status, _) = send(
        &h.app,
        "PUT",
        &format!("/comments/{comment}"),
        Some(&h.admin),
        Some(json!({"content": "hijacked"})),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, v) = send(
        &h.app,
        "PUT",
        &format!("/comments/{comment}"),
        Some(&h.user),
        Some(json!({"content": "Great write-up, thanks!"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["comment"]["content"], json!("Great write-up, thanks!"));

    let (status, v) = send(&h.app, "GET", &format!("/posts/{post}"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["post"]["title"], json!("Primer proyecto"));
    assert_eq!(v["post"]["comments"][0]["author"], json!("grace"));

    let (status, _) = send(&h.app, "DELETE", &format!("/comments/{comment}"), Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&h.app, "DELETE", &format!("/comments/{comment}"), Some(&h.user), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, v) = send(&h.app, "PUT", &format!("/posts/{post}"), Some(&h.admin), Some(json!({"title": "Renamed"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["post"]["title"], json!("Renamed"));

    let (status, _) = send(&h.app, "DELETE", &format!("/posts/{post}"), Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&h.app, "GET", &format!("/posts/{post}"), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, v) = send(&h.app, "GET", "/posts", None, None).await?;
    assert_eq!(v["total"], json!(0));

    let (status, _) = send(
        &h.app,
        "POST",
        "/comments",
        Some(&h.user),
        Some(json!({"post_id": post, "content": "too late"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn comment_delete_requires_owner_or_admin() -> Result<()> {
    let h = setup().await?;

    let (_, v) = send(
        &h.app,
        "POST",
        "/posts",
        Some(&h.admin),
        Some(json!({"title": "Taller", "course_name": "TALLER", "content": "notes"})),
    )
    .await?;
    let post = id_of(&v, "post");

    let (_, v) = send(
        &h.app,
        "POST",
        "/comments",
        Some(&h.admin),
        Some(json!({"post_id": post, "content": "admin remark"})),
    )
    .await?;
    let comment = id_of(&v, "comment");

    let (status, v) = send(&h.app, "DELETE", &format!("/comments/{comment}"), Some(&h.user), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(v["success"], json!(false));

    let (status, _) = send(&h.app, "POST", "/comments", None, Some(json!({"post_id": post, "content": "anon"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn malformed_path_and_query_use_the_error_envelope() -> Result<()> {
    let h = setup().await?;

    for uri in ["/posts/not-a-uuid", "/courses?limite=abc", "/users?desde=-x"] {
        let token = if uri.starts_with("/users") { Some(h.admin.as_str()) } else { None };
        let (status, v) = send(&h.app, "GET", uri, token, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {v}");
        assert_eq!(v["success"], json!(false), "{uri}");
        assert_eq!(v["error"], json!("validation_error"), "{uri}");
    }

    let (status, v) = send(&h.app, "DELETE", "/categories/123", Some(&h.admin), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], json!("validation_error"));

    let (status, v) = send(&h.app, "PUT", "/comments/zzz", Some(&h.user), Some(json!({"content": "x"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], json!("validation_error"));

    Ok(())
}
