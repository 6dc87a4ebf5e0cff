use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

/// Coarse permission class attached to every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    AdminRole,
    UserRole,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::AdminRole => "ADMIN_ROLE",
            Role::UserRole => "USER_ROLE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN_ROLE" => Ok(Role::AdminRole),
            "USER_ROLE" => Ok(Role::UserRole),
            other => Err(AppError::internal(format!("unknown role stored: {other}"))),
        }
    }
}

/// The authenticated identity behind a request, attached by
/// [`authenticate`](super::authenticate).
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::AdminRole)
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            surname: user.surname,
            role: user.role,
            profile_picture: user.profile_picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_spelling_matches_storage() {
        assert_eq!(Role::AdminRole.as_str(), "ADMIN_ROLE");
        assert_eq!("USER_ROLE".parse::<Role>().unwrap(), Role::UserRole);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(serde_json::to_value(Role::AdminRole).unwrap(), "ADMIN_ROLE");
    }
}
