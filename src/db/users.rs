use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::Role;
use crate::errors::AppResult;
use crate::models::user::{DbUser, USER_COLUMNS};

pub async fn find_by_id(pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<DbUser>> {
	let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
	let user = sqlx::query_as::<_, DbUser>(&sql)
		.bind(user_id)
		.fetch_optional(pool)
		.await?;

	Ok(user)
}

/// Lookup used at login. Either identifier may be absent; an absent one never
/// matches. When both are given and hit different rows, the email match wins.
pub async fn find_by_login(
	pool: &SqlitePool,
	email: Option<&str>,
	username: Option<&str>,
) -> AppResult<Option<DbUser>> {
	let sql = format!(
		"SELECT {USER_COLUMNS} FROM users \
		 WHERE (? IS NOT NULL AND email = ? COLLATE NOCASE) OR (? IS NOT NULL AND username = ?) \
		 ORDER BY (? IS NOT NULL AND email = ? COLLATE NOCASE) DESC LIMIT 1"
	);
	let user = sqlx::query_as::<_, DbUser>(&sql)
		.bind(email)
		.bind(email)
		.bind(username)
		.bind(username)
		.bind(email)
		.bind(email)
		.fetch_optional(pool)
		.await?;

	Ok(user)
}

pub async fn find_first_with_role(pool: &SqlitePool, role: Role) -> AppResult<Option<DbUser>> {
	let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY created_at ASC LIMIT 1");
	let user = sqlx::query_as::<_, DbUser>(&sql)
		.bind(role.as_str())
		.fetch_optional(pool)
		.await?;

	Ok(user)
}

pub async fn count_with_role(pool: &SqlitePool, role: Role) -> AppResult<i64> {
	let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE role = ?")
		.bind(role.as_str())
		.fetch_one(pool)
		.await?;

	Ok(count)
}

pub async fn email_taken(pool: &SqlitePool, email: &str, except: Option<Uuid>) -> AppResult<bool> {
	let count: i64 = sqlx::query_scalar(
		"SELECT COUNT(1) FROM users WHERE email = ? COLLATE NOCASE AND (? IS NULL OR id <> ?)",
	)
	.bind(email)
	.bind(except)
	.bind(except)
	.fetch_one(pool)
	.await?;

	Ok(count > 0)
}

pub async fn username_taken(pool: &SqlitePool, username: &str, except: Option<Uuid>) -> AppResult<bool> {
	let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE username = ? AND (? IS NULL OR id <> ?)")
		.bind(username)
		.bind(except)
		.bind(except)
		.fetch_one(pool)
		.await?;

	Ok(count > 0)
}

pub struct NewUser<'a> {
	pub name: &'a str,
	pub surname: &'a str,
	pub username: &'a str,
	pub email: &'a str,
	pub password_hash: &'a str,
	pub phone: &'a str,
	pub profile_picture: Option<&'a str>,
	pub role: Role,
}

pub async fn insert(pool: &SqlitePool, user: NewUser<'_>) -> AppResult<Uuid> {
	let id = Uuid::new_v4();
	let now = crate::utils::utc_now();

	sqlx::query(
		"INSERT INTO users (id, name, surname, username, email, password_hash, phone, profile_picture, role, status, created_at, updated_at) \
		 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
	)
	.bind(id)
	.bind(user.name)
	.bind(user.surname)
	.bind(user.username)
	.bind(user.email)
	.bind(user.password_hash)
	.bind(user.phone)
	.bind(user.profile_picture)
	.bind(user.role.as_str())
	.bind(now)
	.bind(now)
	.execute(pool)
	.await?;

	Ok(id)
}
