use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::modules::auth::core::account::AuthError;
use crate::modules::auth::use_cases::login::{Login, login, resolve_bearer};
use crate::modules::auth::use_cases::register_account::{RegisterAccount, register_account};
use crate::shared::core::detail::detail;
use crate::shell::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handle_register))
        .route("/login", post(handle_login))
        .route("/me", get(handle_me))
}

pub async fn handle_register(
    State(state): State<AppState>,
    body: Result<Json<RegisterAccount>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return detail(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };

    match register_account(state.accounts.as_ref(), body).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<Login>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return detail(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };

    match login(state.accounts.as_ref(), body).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_me(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match resolve_bearer(state.accounts.as_ref(), bearer_token(&headers)).await {
        Ok(account) => Json(account).into_response(),
        Err(e) => into_response(e),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn into_response(e: AuthError) -> Response {
    match e {
        AuthError::Invalid(_) => detail(StatusCode::BAD_REQUEST, e),
        AuthError::EmailTaken => detail(StatusCode::CONFLICT, e),
        AuthError::InvalidCredentials | AuthError::Unauthenticated => {
            detail(StatusCode::UNAUTHORIZED, e)
        }
        AuthError::Password(_) | AuthError::Store(_) => {
            error!(error = %e, "auth request failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
