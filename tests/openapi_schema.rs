use serde_json::Value;

#[test]
fn openapi_documents_every_resource() -> anyhow::Result<()> {
    let doc = spacesocial::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let paths = v
        .get("paths")
        .and_then(Value::as_object)
        .expect("paths must exist");

    for path in [
        "/auth/register",
        "/auth/login",
        "/auth/me",
        "/users",
        "/users/profile",
        "/users/password",
        "/categories",
        "/categories/{id}",
        "/categories/by-name/{name}",
        "/courses",
        "/courses/by-name/{name}",
        "/posts",
        "/posts/{id}",
        "/comments",
        "/comments/{id}",
        "/api/health",
    ] {
        assert!(paths.contains_key(path), "OpenAPI missing path '{}'", path);
    }

    let posts = &paths["/posts"];
    assert!(posts.get("get").is_some() && posts.get("post").is_some());

    Ok(())
}

#[test]
fn user_schema_exposes_role_but_not_hash() -> anyhow::Result<()> {
    let doc = spacesocial::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let props = v
        .pointer("/components/schemas/User/properties")
        .and_then(Value::as_object)
        .expect("components.schemas.User.properties must exist");

    assert!(props.contains_key("role"));
    assert!(props.contains_key("username"));
    assert!(!props.contains_key("password_hash"));

    let login = v
        .pointer("/components/schemas/LoginResponse/properties")
        .and_then(Value::as_object)
        .expect("LoginResponse schema must exist");
    assert!(login.contains_key("profilePicture"), "login response is camelCase");

    Ok(())
}
