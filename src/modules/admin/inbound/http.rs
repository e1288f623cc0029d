use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::modules::admin::use_cases::update_status::{AdminError, UpdateStatus, update_status};
use crate::modules::care_records::core::ports::RecordsError;
use crate::shared::core::detail::detail;
use crate::shell::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(handle_appointments))
        .route("/pharmacy_queue", get(handle_pharmacy_queue))
        .route("/update_status", post(handle_update_status))
}

pub async fn handle_appointments(State(state): State<AppState>) -> impl IntoResponse {
    match state.appointments.list_all().await {
        Ok(appointments) => Json(appointments).into_response(),
        Err(e) => into_response(e.into()),
    }
}

pub async fn handle_pharmacy_queue(State(state): State<AppState>) -> impl IntoResponse {
    match state.prescriptions.list_all().await {
        Ok(prescriptions) => Json(prescriptions).into_response(),
        Err(e) => into_response(e.into()),
    }
}

pub async fn handle_update_status(
    State(state): State<AppState>,
    query: Result<Query<UpdateStatus>, QueryRejection>,
) -> impl IntoResponse {
    let Query(command) = match query {
        Ok(q) => q,
        Err(rejection) => return detail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match update_status(
        state.appointments.as_ref(),
        state.prescriptions.as_ref(),
        &state.socket_manager,
        command,
    )
    .await
    {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => into_response(e),
    }
}

fn into_response(e: AdminError) -> Response {
    match e {
        AdminError::UnknownItemType(_)
        | AdminError::UnknownStatus(_)
        | AdminError::MissingReschedule
        | AdminError::Schedule(_) => detail(StatusCode::BAD_REQUEST, e),
        AdminError::Records(RecordsError::NotFound { .. }) => detail(StatusCode::NOT_FOUND, e),
        AdminError::Records(RecordsError::SlotTaken(_)) => detail(StatusCode::CONFLICT, e),
        AdminError::Records(RecordsError::Backend(_)) => {
            error!(error = %e, "admin request failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
