use crate::modules::auth::core::ports::AccountRepository;
use crate::modules::care_records::core::ports::PrescriptionRepository;
use crate::modules::care_records::core::prescription::{NewPrescription, Prescription};
use crate::modules::patient::errors::PatientError;
use crate::modules::patient::use_cases::list_slots::ensure_patient;
use crate::shared::infrastructure::realtime::SocketManager;

pub const NEW_PRESCRIPTION_EVENT: &str = "new_prescription";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A prescription file already read from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadPrescription {
    pub patient_id: i64,
    pub file_name: String,
    pub size_bytes: u64,
}

pub async fn upload_prescription(
    accounts: &dyn AccountRepository,
    prescriptions: &dyn PrescriptionRepository,
    notifier: &SocketManager,
    upload: UploadPrescription,
) -> Result<Prescription, PatientError> {
    let file_name = upload.file_name.trim();
    if file_name.is_empty() {
        return Err(PatientError::Invalid("file name is required".into()));
    }
    if upload.size_bytes == 0 {
        return Err(PatientError::Invalid("uploaded file is empty".into()));
    }
    ensure_patient(accounts, upload.patient_id).await?;

    let prescription = prescriptions
        .create(NewPrescription {
            patient_id: upload.patient_id,
            file_name: file_name.to_string(),
            size_bytes: upload.size_bytes,
        })
        .await?;

    tracing::info!(
        prescription_id = prescription.id,
        size_bytes = prescription.size_bytes,
        "prescription uploaded"
    );
    notifier.emit(NEW_PRESCRIPTION_EVENT, &prescription);
    Ok(prescription)
}
