use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentStatus, NewAppointment,
};
use crate::modules::care_records::core::prescription::{
    NewPrescription, Prescription, PrescriptionStatus,
};

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("slot {0} is already booked")]
    SlotTaken(NaiveDateTime),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Stores a new appointment. A consultation fails with `SlotTaken` when
    /// its doctor already holds a non-cancelled appointment at that time.
    async fn book(&self, appointment: NewAppointment) -> Result<Appointment, RecordsError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, RecordsError>;
    async fn list_all(&self) -> Result<Vec<Appointment>, RecordsError>;
    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, RecordsError>;
    async fn taken_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<NaiveDateTime>, RecordsError>;
    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        reschedule_to: Option<NaiveDateTime>,
    ) -> Result<Appointment, RecordsError>;
}

#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription, RecordsError>;
    async fn list_all(&self) -> Result<Vec<Prescription>, RecordsError>;
    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Prescription>, RecordsError>;
    async fn update_status(
        &self,
        id: i64,
        status: PrescriptionStatus,
    ) -> Result<Prescription, RecordsError>;
}
