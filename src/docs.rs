use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::authz::Role;
use crate::models;
use crate::routes::{auth, categories, comments, courses, health, posts, users};

#[derive(OpenApi)]
#[openapi(
	paths(
		auth::register,
		auth::login,
		auth::me,
		users::list_users,
		users::update_profile,
		users::update_password,
		categories::list_categories,
		categories::get_category_by_name,
		categories::create_category,
		categories::update_category,
		categories::delete_category,
		courses::list_courses,
		courses::get_course_by_name,
		posts::list_posts,
		posts::get_post,
		posts::create_post,
		posts::update_post,
		posts::delete_post,
		comments::create_comment,
		comments::update_comment,
		comments::delete_comment,
		health::health
	),
	components(
		schemas(
			Role,
			models::MessageResponse,
			models::user::User,
			models::user::RegisterRequest,
			models::user::RegisterResponse,
			models::user::LoginRequest,
			models::user::LoginResponse,
			models::user::UserResponse,
			models::user::UserListResponse,
			models::user::UserUpdatedResponse,
			models::user::UpdateProfileRequest,
			models::user::UpdatePasswordRequest,
			models::category::Category,
			models::category::CategorySummary,
			models::category::CategoryRequest,
			models::category::CategoryResponse,
			models::category::CategoryListResponse,
			models::course::Course,
			models::course::CourseSummary,
			models::course::CourseResponse,
			models::course::CourseListResponse,
			models::post::Post,
			models::post::PostSummary,
			models::post::PostDetail,
			models::post::PostCreateRequest,
			models::post::PostUpdateRequest,
			models::post::PostResponse,
			models::post::PostListResponse,
			models::post::PostDetailResponse,
			models::comment::Comment,
			models::comment::CommentView,
			models::comment::CommentCreateRequest,
			models::comment::CommentUpdateRequest,
			models::comment::CommentResponse,
			health::HealthResponse
		)
	),
	tags(
		(name = "Auth", description = "Registration, login and the current principal"),
		(name = "Users", description = "User administration and self-service profile"),
		(name = "Categories", description = "Post categories"),
		(name = "Courses", description = "Courses posts are attached to"),
		(name = "Posts", description = "Blog posts"),
		(name = "Comments", description = "Comments on posts"),
		(name = "Health", description = "Liveness and store reachability")
	)
)]
pub struct ApiDoc;

/// Generated document plus the bearer scheme, request examples and a
/// `servers` entry pointing at the local listener.
pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	normalize_path_operations(&mut doc);
	ensure_security_components(&mut doc)?;
	add_examples(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = get(move || {
		let doc_json = Arc::clone(&doc_json);
		async move { Json((*doc_json).clone()) }
	});

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn normalize_path_operations(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		let snapshot = paths.clone();
		for (path, item) in snapshot {
			if let Some(ops) = item.as_object() {
				let mut normalized = Map::new();
				for (method, val) in ops {
					let key = method.to_lowercase();
					if let Some(existing) = normalized.get_mut(&key) {
						merge_values(existing, val);
					} else {
						normalized.insert(key, val.clone());
					}
				}
				paths.insert(path, Value::Object(normalized));
			}
		}
	}
}

fn ensure_security_components(doc: &mut Value) -> anyhow::Result<()> {
	let root = doc
		.as_object_mut()
		.ok_or_else(|| anyhow::anyhow!("OpenAPI root must be an object"))?;

	let schemes = root
		.entry("components")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.ok_or_else(|| anyhow::anyhow!("components must be an object"))?
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.ok_or_else(|| anyhow::anyhow!("securitySchemes must be an object"))?;

	schemes.insert(
		"bearerAuth".to_string(),
		json!({
			"type": "http",
			"scheme": "bearer",
			"bearerFormat": "JWT"
		}),
	);

	Ok(())
}

fn add_examples(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		for item in paths.values_mut() {
			if let Some(operations) = item.as_object_mut() {
				for operation in operations.values_mut() {
					apply_parameter_examples(operation);
					apply_request_examples(operation);
				}
			}
		}
	}
}

fn apply_parameter_examples(operation: &mut Value) {
	let Some(parameters) = operation.get_mut("parameters").and_then(Value::as_array_mut) else { return; };

	for parameter in parameters.iter_mut() {
		let example = match parameter.get("name").and_then(Value::as_str) {
			Some("id") => json!("00000000-0000-0000-0000-000000000000"),
			Some("name") => json!("tecnologia"),
			Some("course") => json!("TECNOLOGIA"),
			_ => continue,
		};
		if let Some(obj) = parameter.as_object_mut() {
			obj.entry("example").or_insert(example);
		}
	}
}

fn apply_request_examples(operation: &mut Value) {
	let Some(request_body) = operation.get_mut("requestBody") else { return; };
	let Some(content) = request_body.get_mut("content").and_then(Value::as_object_mut) else { return; };
	let Some(app_json) = content.get_mut("application/json").and_then(Value::as_object_mut) else { return; };
	let Some(schema) = app_json.get("schema").and_then(Value::as_object) else { return; };
	let Some(reference) = schema.get("$ref").and_then(Value::as_str) else { return; };

	let example = match reference {
		"#/components/schemas/LoginRequest" => Some(json!({
			"username": "admin_role",
			"password": "S3cureP@ssw0rd"
		})),
		"#/components/schemas/RegisterRequest" => Some(json!({
			"name": "Ada",
			"surname": "Lovelace",
			"username": "ada",
			"email": "ada@example.com",
			"password": "S3cureP@ssw0rd",
			"phone": "55512345"
		})),
		"#/components/schemas/UpdatePasswordRequest" => Some(json!({
			"current_password": "S3cureP@ssw0rd",
			"new_password": "N3wS3cureP@ss"
		})),
		"#/components/schemas/PostCreateRequest" => Some(json!({
			"title": "Primer proyecto",
			"course_name": "TECNOLOGIA",
			"content": "Notes from the first workshop."
		})),
		"#/components/schemas/CommentCreateRequest" => Some(json!({
			"post_id": "00000000-0000-0000-0000-000000000000",
			"content": "Great write-up!"
		})),
		_ => None,
	};

	if let Some(example) = example {
		app_json.insert("example".to_string(), example);
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let tls_enabled = std::env::var("CERT_PATH").is_ok() && std::env::var("KEY_PATH").is_ok();
	let scheme = if tls_enabled { "https" } else { "http" };
	let server_url = format!("{scheme}://localhost:{port}");

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}

fn merge_values(target: &mut Value, addition: &Value) {
	match (target, addition) {
		(Value::Object(dest), Value::Object(src)) => {
			for (key, value) in src {
				if let Some(existing) = dest.get_mut(key) {
					merge_values(existing, value);
				} else {
					dest.insert(key.clone(), value.clone());
				}
			}
		}
		(Value::Array(dest), Value::Array(src)) => {
			for item in src {
				if !dest.contains(item) {
					dest.push(item.clone());
				}
			}
		}
		_ => {}
	}
}
