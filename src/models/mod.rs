use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub mod category;
pub mod comment;
pub mod course;
pub mod post;
pub mod user;

/// Pagination accepted by the list endpoints. `limite`/`desde` are kept as
/// aliases for older clients.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(alias = "limite")]
    pub limit: Option<i64>,
    #[serde(alias = "desde")]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
