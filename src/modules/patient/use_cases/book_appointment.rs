use serde::Deserialize;

use crate::modules::auth::core::ports::AccountRepository;
use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentKind, NewAppointment,
};
use crate::modules::care_records::core::ports::AppointmentRepository;
use crate::modules::care_records::core::schedule::{
    ScheduleError, is_on_grid, parse_date, parse_time,
};
use crate::modules::patient::errors::PatientError;
use crate::modules::patient::use_cases::list_slots::{ensure_doctor, ensure_patient};
use crate::shared::infrastructure::realtime::SocketManager;

pub const NEW_APPOINTMENT_EVENT: &str = "new_appointment";

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn book_appointment(
    accounts: &dyn AccountRepository,
    appointments: &dyn AppointmentRepository,
    notifier: &SocketManager,
    command: BookAppointment,
) -> Result<Appointment, PatientError> {
    let date = parse_date(&command.date)?;
    let time = parse_time(&command.time)?;
    if !is_on_grid(time) {
        return Err(ScheduleError::OffGrid(command.time).into());
    }
    ensure_patient(accounts, command.patient_id).await?;
    ensure_doctor(accounts, command.doctor_id).await?;

    let appointment = appointments
        .book(NewAppointment {
            patient_id: command.patient_id,
            doctor_id: Some(command.doctor_id),
            kind: AppointmentKind::Consultation,
            test_name: None,
            reason: command
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            appointment_time: date.and_time(time),
        })
        .await?;

    tracing::info!(
        appointment_id = appointment.id,
        doctor_id = command.doctor_id,
        at = %appointment.appointment_time,
        "appointment booked"
    );
    notifier.emit(NEW_APPOINTMENT_EVENT, &appointment);
    Ok(appointment)
}
