pub mod auth;
pub mod categories;
pub mod comments;
pub mod courses;
pub mod health;
pub mod posts;
pub mod users;
