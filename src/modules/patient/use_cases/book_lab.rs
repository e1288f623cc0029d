use serde::Deserialize;

use crate::modules::auth::core::ports::AccountRepository;
use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentKind, NewAppointment,
};
use crate::modules::care_records::core::ports::AppointmentRepository;
use crate::modules::care_records::core::schedule::parse_moment;
use crate::modules::patient::errors::PatientError;
use crate::modules::patient::use_cases::book_appointment::NEW_APPOINTMENT_EVENT;
use crate::modules::patient::use_cases::list_slots::ensure_patient;
use crate::shared::infrastructure::realtime::SocketManager;

#[derive(Debug, Clone, Deserialize)]
pub struct BookLab {
    pub patient_id: i64,
    pub test_name: String,
    pub date: String,
    pub time: String,
}

/// Lab tests are not tied to a doctor, so they skip the slot grid and the
/// double-booking check.
pub async fn book_lab(
    accounts: &dyn AccountRepository,
    appointments: &dyn AppointmentRepository,
    notifier: &SocketManager,
    command: BookLab,
) -> Result<Appointment, PatientError> {
    let test_name = command.test_name.trim();
    if test_name.is_empty() {
        return Err(PatientError::Invalid("test_name is required".into()));
    }
    let appointment_time = parse_moment(&command.date, &command.time)?;
    ensure_patient(accounts, command.patient_id).await?;

    let appointment = appointments
        .book(NewAppointment {
            patient_id: command.patient_id,
            doctor_id: None,
            kind: AppointmentKind::LabTest,
            test_name: Some(test_name.to_string()),
            reason: None,
            appointment_time,
        })
        .await?;

    tracing::info!(appointment_id = appointment.id, test_name, "lab test booked");
    notifier.emit(NEW_APPOINTMENT_EVENT, &appointment);
    Ok(appointment)
}
