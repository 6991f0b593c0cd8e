use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned by every failing endpoint.
///
/// Success bodies are the bare resource so that browser clients can consume
/// `/files` and `/active-links` as plain arrays.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// Machine-readable error kind (e.g. `object_not_found`, `backend_unavailable`)
    pub code: String,
    pub message: String,
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message,
            errors,
        }
    }
}
