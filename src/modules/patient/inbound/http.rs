use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::modules::care_records::core::ports::RecordsError;
use crate::modules::patient::errors::PatientError;
use crate::modules::patient::use_cases::book_appointment::{BookAppointment, book_appointment};
use crate::modules::patient::use_cases::book_lab::{BookLab, book_lab};
use crate::modules::patient::use_cases::list_slots::{ListSlots, list_doctors, list_slots};
use crate::modules::patient::use_cases::upload_prescription::{
    MAX_UPLOAD_BYTES, UploadPrescription, upload_prescription,
};
use crate::shared::core::detail::detail;
use crate::shell::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(handle_doctors))
        .route("/slots", get(handle_slots))
        .route("/book_appointment", post(handle_book_appointment))
        .route("/book_lab", post(handle_book_lab))
        .route(
            "/upload_prescription",
            post(handle_upload_prescription).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/my_appointments/{id}", get(handle_my_appointments))
        .route("/my_prescriptions/{id}", get(handle_my_prescriptions))
}

pub async fn handle_doctors(State(state): State<AppState>) -> impl IntoResponse {
    match list_doctors(state.accounts.as_ref()).await {
        Ok(doctors) => Json(doctors).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_slots(
    State(state): State<AppState>,
    query: Result<Query<ListSlots>, QueryRejection>,
) -> impl IntoResponse {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return detail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match list_slots(state.accounts.as_ref(), state.appointments.as_ref(), query).await {
        Ok(slots) => Json(slots).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_book_appointment(
    State(state): State<AppState>,
    body: Result<Json<BookAppointment>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return detail(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };

    match book_appointment(
        state.accounts.as_ref(),
        state.appointments.as_ref(),
        &state.socket_manager,
        body,
    )
    .await
    {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_book_lab(
    State(state): State<AppState>,
    body: Result<Json<BookLab>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return detail(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text()),
    };

    match book_lab(
        state.accounts.as_ref(),
        state.appointments.as_ref(),
        &state.socket_manager,
        body,
    )
    .await
    {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_upload_prescription(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let upload = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => upload,
            Err(response) => return response,
        },
        Err(rejection) => return detail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match upload_prescription(
        state.accounts.as_ref(),
        state.prescriptions.as_ref(),
        &state.socket_manager,
        upload,
    )
    .await
    {
        Ok(prescription) => (StatusCode::CREATED, Json(prescription)).into_response(),
        Err(e) => into_response(e),
    }
}

pub async fn handle_my_appointments(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(patient_id) = match path {
        Ok(p) => p,
        Err(rejection) => return detail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.appointments.list_by_patient(patient_id).await {
        Ok(appointments) => Json(appointments).into_response(),
        Err(e) => into_response(e.into()),
    }
}

pub async fn handle_my_prescriptions(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> impl IntoResponse {
    let Path(patient_id) = match path {
        Ok(p) => p,
        Err(rejection) => return detail(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.prescriptions.list_by_patient(patient_id).await {
        Ok(prescriptions) => Json(prescriptions).into_response(),
        Err(e) => into_response(e.into()),
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadPrescription, Response> {
    let mut patient_id = None;
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(detail(e.status(), e.body_text())),
        };
        match field.name().map(str::to_string).as_deref() {
            Some("patient_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| detail(e.status(), e.body_text()))?;
                let id = raw.trim().parse::<i64>().map_err(|_| {
                    detail(
                        StatusCode::BAD_REQUEST,
                        format!("invalid patient_id: {raw}"),
                    )
                })?;
                patient_id = Some(id);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| detail(e.status(), e.body_text()))?;
                file = Some((file_name, bytes.len() as u64));
            }
            _ => {}
        }
    }

    match (patient_id, file) {
        (Some(patient_id), Some((file_name, size_bytes))) => Ok(UploadPrescription {
            patient_id,
            file_name,
            size_bytes,
        }),
        (None, _) => Err(detail(StatusCode::BAD_REQUEST, "patient_id is required")),
        (_, None) => Err(detail(StatusCode::BAD_REQUEST, "file is required")),
    }
}

fn into_response(e: PatientError) -> Response {
    match e {
        PatientError::Invalid(_) | PatientError::Schedule(_) => detail(StatusCode::BAD_REQUEST, e),
        PatientError::UnknownPatient(_)
        | PatientError::UnknownDoctor(_)
        | PatientError::Records(RecordsError::NotFound { .. }) => detail(StatusCode::NOT_FOUND, e),
        PatientError::Records(RecordsError::SlotTaken(_)) => detail(StatusCode::CONFLICT, e),
        PatientError::Records(RecordsError::Backend(_)) | PatientError::Accounts(_) => {
            error!(error = %e, "patient request failed");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
