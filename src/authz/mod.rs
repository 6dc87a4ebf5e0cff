//! Authentication and authorization gates.
//!
//! Route composition order is `authenticate` (outer) → `require_roles`
//! (inner) → request validation → handler. `authenticate` attaches a
//! [`Principal`] to the request; `require_roles` and [`CurrentUser`] read it.

mod middleware;
mod principal;

pub use middleware::{authenticate, bearer_token, require_roles, CurrentUser, ADMIN_ONLY};
pub use principal::{Principal, Role};
