use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error body shared by every route group: `{"detail": "<message>"}`.
pub fn detail(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "detail": message.to_string() }))).into_response()
}
