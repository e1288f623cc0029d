use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::modules::admin::inbound::http as admin_http;
use crate::modules::auth::inbound::http as auth_http;
use crate::modules::patient::inbound::http as patient_http;
use crate::shared::core::detail::detail;
use crate::shell::config::Settings;
use crate::shell::state::AppState;

pub const HEALTH_STATUS: &str = "online";
pub const HEALTH_MESSAGE: &str = "Healthcare Enterprise Platform is Running";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .nest("/auth", auth_http::router())
        .nest("/patient", patient_http::router())
        .nest("/admin", admin_http::router())
        .fallback(not_found)
        .with_state(state)
}

/// Any origin, method and header. With credentials enabled the request's
/// own origin is echoed back, since `*` cannot be combined with
/// `Access-Control-Allow-Credentials`.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    if settings.cors_allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(%uri, "no route matched");
    detail(StatusCode::NOT_FOUND, "Not Found")
}
