//! Startup seeding: the distinguished administrator plus the default
//! categories and courses.
//!
//! Every step is idempotent and safe to run from several processes at once.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::Role;
use crate::db;
use crate::errors::{AppError, AppResult};
use crate::utils::{hash_password, utc_now};

pub const DEFAULT_CATEGORIES: [&str; 3] = ["sport", "salud", "global"];
pub const DEFAULT_COURSES: [&str; 3] = ["TECNOLOGIA", "TALLER", "PRACTICA SUPERVISADA"];

/// Identity of the administrator created on an empty database.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            surname: "Space".to_string(),
            username: "admin_role".to_string(),
            email: "admin@spacesocial.com".to_string(),
            phone: "21326554".to_string(),
            password: "ADMIN25$ki".to_string(),
        }
    }
}

impl AdminSeed {
    pub fn from_env() -> Self {
        let mut seed = Self::default();
        if let Ok(username) = std::env::var("BOOTSTRAP_ADMIN_USERNAME") {
            seed.username = username;
        }
        if let Ok(email) = std::env::var("BOOTSTRAP_ADMIN_EMAIL") {
            seed.email = email.to_lowercase();
        }
        if let Ok(password) = std::env::var("BOOTSTRAP_ADMIN_PASSWORD") {
            seed.password = password;
        }
        seed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(Uuid),
    AlreadyPresent,
}

/// Creates the seed administrator unless some `ADMIN_ROLE` principal already
/// exists. Losing an insert race to another process counts as already present;
/// a unique clash with a non-admin account holding the seed identity is an
/// error.
pub async fn ensure_admin(pool: &SqlitePool, seed: &AdminSeed) -> AppResult<BootstrapOutcome> {
    if db::users::count_with_role(pool, Role::AdminRole).await? > 0 {
        tracing::debug!("admin principal already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let password_hash = hash_password(&seed.password)?;
    let inserted = db::users::insert(
        pool,
        db::users::NewUser {
            name: &seed.name,
            surname: &seed.surname,
            username: &seed.username,
            email: &seed.email,
            password_hash: &password_hash,
            phone: &seed.phone,
            profile_picture: None,
            role: Role::AdminRole,
        },
    )
    .await;

    match inserted {
        Ok(id) => {
            tracing::info!(user_id = %id, username = %seed.username, "created bootstrap admin");
            Ok(BootstrapOutcome::Created(id))
        }
        Err(err) if err.is_unique_violation() => {
            if db::users::count_with_role(pool, Role::AdminRole).await? > 0 {
                tracing::info!(username = %seed.username, "bootstrap admin inserted concurrently");
                return Ok(BootstrapOutcome::AlreadyPresent);
            }
            tracing::warn!(username = %seed.username, email = %seed.email, "seed admin identity held by a non-admin account");
            Err(AppError::conflict(format!(
                "the username {} or email {} is taken by a non-admin account",
                seed.username, seed.email
            )))
        }
        Err(err) => Err(err),
    }
}

/// Inserts the default categories and courses that are not there yet.
/// Categories are attributed to the first administrator and skipped when none
/// exists.
pub async fn seed_defaults(pool: &SqlitePool) -> AppResult<()> {
    match db::users::find_first_with_role(pool, Role::AdminRole).await? {
        Some(admin) => {
            for name in DEFAULT_CATEGORIES {
                insert_if_missing(pool, Catalog::Category { created_by: admin.id }, name).await?;
            }
        }
        None => tracing::warn!("no ADMIN_ROLE principal found, skipping default categories"),
    }

    for name in DEFAULT_COURSES {
        insert_if_missing(pool, Catalog::Course, name).await?;
    }

    Ok(())
}

/// Runs the whole startup sequence. Failures are logged and swallowed: the
/// server keeps starting without an admin rather than not at all.
pub async fn run_startup(pool: &SqlitePool, seed: &AdminSeed) {
    if let Err(err) = ensure_admin(pool, seed).await {
        tracing::error!(error = %err, "failed to bootstrap admin principal");
    }

    if let Err(err) = seed_defaults(pool).await {
        tracing::error!(error = %err, "failed to seed default catalog");
    }
}

enum Catalog {
    Category { created_by: Uuid },
    Course,
}

async fn insert_if_missing(pool: &SqlitePool, kind: Catalog, name: &str) -> AppResult<()> {
    let table = match kind {
        Catalog::Category { .. } => "categories",
        Catalog::Course => "courses",
    };

    let exists: i64 = sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {table} WHERE name = ? COLLATE NOCASE"))
        .bind(name)
        .fetch_one(pool)
        .await?;

    if exists > 0 {
        tracing::debug!(table, name, "default entry already present");
        return Ok(());
    }

    let now = utc_now();
    let result = match kind {
        Catalog::Category { created_by } => {
            sqlx::query(
                "INSERT INTO categories (id, name, status, is_default, created_by, created_at, updated_at) VALUES (?, ?, 1, 1, ?, ?, ?)",
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(created_by)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
        }
        Catalog::Course => {
            sqlx::query("INSERT INTO courses (id, name, status, created_at, updated_at) VALUES (?, ?, 1, ?, ?)")
                .bind(Uuid::new_v4())
                .bind(name)
                .bind(now)
                .bind(now)
                .execute(pool)
                .await
        }
    };

    match result.map_err(AppError::from) {
        Ok(_) => {
            tracing::info!(table, name, "seeded default entry");
            Ok(())
        }
        Err(err) if err.is_unique_violation() => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seed_matches_documented_admin() {
        let seed = AdminSeed::default();
        assert_eq!(seed.username, "admin_role");
        assert_eq!(seed.email, "admin@spacesocial.com");
        assert_eq!(seed.password, "ADMIN25$ki");
    }
}
