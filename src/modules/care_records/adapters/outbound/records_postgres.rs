// PostgreSQL implementation of the appointment and prescription ports.
//
// Purpose
// - Persist care records in the `appointments` and `prescriptions` tables.
//
// Responsibilities
// - Rely on the `appointments_doctor_slot` partial unique index to keep a
//   doctor's live consultation slots unique, reporting clashes as `SlotTaken`.
// - Rebuild domain records from stored rows.

use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentKind, AppointmentStatus, NewAppointment,
};
use crate::modules::care_records::core::ports::{
    AppointmentRepository, PrescriptionRepository, RecordsError,
};
use crate::modules::care_records::core::prescription::{
    NewPrescription, Prescription, PrescriptionStatus,
};
use crate::shared::infrastructure::database::is_unique_violation;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::PgPool;

const APPOINTMENT_COLUMNS: &str =
    "id, patient_id, doctor_id, type AS kind, test_name, reason, appointment_time, status, created_at";
const PRESCRIPTION_COLUMNS: &str =
    "id, patient_id, file_name, size_bytes, extracted_data, status, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct AppointmentRow {
    id: i64,
    patient_id: i64,
    doctor_id: Option<i64>,
    kind: String,
    test_name: Option<String>,
    reason: Option<String>,
    appointment_time: NaiveDateTime,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = RecordsError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            kind: row.kind.parse::<AppointmentKind>().map_err(corrupt)?,
            test_name: row.test_name,
            reason: row.reason,
            appointment_time: row.appointment_time,
            status: row.status.parse::<AppointmentStatus>().map_err(corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PrescriptionRow {
    id: i64,
    patient_id: i64,
    file_name: String,
    size_bytes: i64,
    extracted_data: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PrescriptionRow> for Prescription {
    type Error = RecordsError;

    fn try_from(row: PrescriptionRow) -> Result<Self, Self::Error> {
        Ok(Prescription {
            id: row.id,
            patient_id: row.patient_id,
            file_name: row.file_name,
            size_bytes: u64::try_from(row.size_bytes).map_err(corrupt)?,
            extracted_data: row.extracted_data,
            status: row.status.parse::<PrescriptionStatus>().map_err(corrupt)?,
            created_at: row.created_at,
        })
    }
}

fn corrupt(error: impl std::fmt::Display) -> RecordsError {
    RecordsError::Backend(format!("corrupt row: {error}"))
}

fn backend(error: sqlx::Error) -> RecordsError {
    RecordsError::Backend(error.to_string())
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, RecordsError>
where
    T: TryFrom<R, Error = RecordsError>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub struct PostgresCareRecords {
    pool: PgPool,
}

impl PostgresCareRecords {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AppointmentRepository for PostgresCareRecords {
    async fn book(&self, appointment: NewAppointment) -> Result<Appointment, RecordsError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "INSERT INTO appointments (patient_id, doctor_id, type, test_name, reason, appointment_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(appointment.patient_id)
        .bind(appointment.doctor_id)
        .bind(appointment.kind.as_str())
        .bind(&appointment.test_name)
        .bind(&appointment.reason)
        .bind(appointment.appointment_time)
        .bind(AppointmentStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RecordsError::SlotTaken(appointment.appointment_time)
            } else {
                backend(e)
            }
        })?;
        Appointment::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, RecordsError> {
        sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(Appointment::try_from)
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, RecordsError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY appointment_time, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        collect(rows)
    }

    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, RecordsError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE patient_id = $1 \
             ORDER BY appointment_time, id"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        collect(rows)
    }

    async fn taken_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<NaiveDateTime>, RecordsError> {
        sqlx::query_scalar::<_, NaiveDateTime>(
            "SELECT appointment_time FROM appointments \
             WHERE type = 'consultation' AND doctor_id = $1 \
             AND appointment_time::date = $2 AND status <> 'cancelled' \
             ORDER BY appointment_time",
        )
        .bind(doctor_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        reschedule_to: Option<NaiveDateTime>,
    ) -> Result<Appointment, RecordsError> {
        let result = sqlx::query_as::<_, AppointmentRow>(&format!(
            "UPDATE appointments SET status = $1, appointment_time = COALESCE($2, appointment_time) \
             WHERE id = $3 RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(reschedule_to)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Appointment::try_from(row),
            Ok(None) => Err(RecordsError::NotFound {
                kind: "appointment",
                id,
            }),
            Err(e) if is_unique_violation(&e) => {
                let at = match reschedule_to {
                    Some(at) => at,
                    None => self
                        .find_by_id(id)
                        .await?
                        .map(|current| current.appointment_time)
                        .ok_or(RecordsError::NotFound {
                            kind: "appointment",
                            id,
                        })?,
                };
                Err(RecordsError::SlotTaken(at))
            }
            Err(e) => Err(backend(e)),
        }
    }
}

#[async_trait::async_trait]
impl PrescriptionRepository for PostgresCareRecords {
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription, RecordsError> {
        let size_bytes = i64::try_from(prescription.size_bytes).map_err(corrupt)?;
        let row = sqlx::query_as::<_, PrescriptionRow>(&format!(
            "INSERT INTO prescriptions (patient_id, file_name, size_bytes, status) \
             VALUES ($1, $2, $3, $4) RETURNING {PRESCRIPTION_COLUMNS}"
        ))
        .bind(prescription.patient_id)
        .bind(&prescription.file_name)
        .bind(size_bytes)
        .bind(PrescriptionStatus::Preparing.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Prescription::try_from(row)
    }

    async fn list_all(&self) -> Result<Vec<Prescription>, RecordsError> {
        let rows = sqlx::query_as::<_, PrescriptionRow>(&format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        collect(rows)
    }

    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Prescription>, RecordsError> {
        let rows = sqlx::query_as::<_, PrescriptionRow>(&format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE patient_id = $1 ORDER BY id"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        collect(rows)
    }

    async fn update_status(
        &self,
        id: i64,
        status: PrescriptionStatus,
    ) -> Result<Prescription, RecordsError> {
        sqlx::query_as::<_, PrescriptionRow>(&format!(
            "UPDATE prescriptions SET status = $1 WHERE id = $2 RETURNING {PRESCRIPTION_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or(RecordsError::NotFound {
            kind: "prescription",
            id,
        })
        .and_then(Prescription::try_from)
    }
}

#[cfg(test)]
mod postgres_care_records_tests {
    use super::*;
    use crate::modules::care_records::core::schedule::parse_moment;
    use rstest::{fixture, rstest};

    #[fixture]
    fn appointment_row() -> AppointmentRow {
        AppointmentRow {
            id: 9,
            patient_id: 1,
            doctor_id: Some(2),
            kind: "consultation".into(),
            test_name: None,
            reason: Some("check-up".into()),
            appointment_time: parse_moment("2026-10-16", "09:30").unwrap(),
            status: "rescheduled".into(),
            created_at: Utc::now(),
        }
    }

    #[fixture]
    fn prescription_row() -> PrescriptionRow {
        PrescriptionRow {
            id: 3,
            patient_id: 1,
            file_name: "rx.png".into(),
            size_bytes: 2048,
            extracted_data: None,
            status: "ready".into(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn it_should_rebuild_an_appointment_from_its_row(appointment_row: AppointmentRow) {
        let appointment = Appointment::try_from(appointment_row).unwrap();
        assert_eq!(appointment.kind, AppointmentKind::Consultation);
        assert_eq!(appointment.status, AppointmentStatus::Rescheduled);
        assert_eq!(appointment.doctor_id, Some(2));
    }

    #[rstest]
    #[case("kind")]
    #[case("status")]
    fn it_should_refuse_an_appointment_row_with_unknown_labels(
        mut appointment_row: AppointmentRow,
        #[case] column: &str,
    ) {
        match column {
            "kind" => appointment_row.kind = "surgery".into(),
            _ => appointment_row.status = "lost".into(),
        }
        let result = Appointment::try_from(appointment_row);
        assert!(matches!(result, Err(RecordsError::Backend(_))));
    }

    #[rstest]
    fn it_should_rebuild_a_prescription_from_its_row(prescription_row: PrescriptionRow) {
        let prescription = Prescription::try_from(prescription_row).unwrap();
        assert_eq!(prescription.size_bytes, 2048);
        assert_eq!(prescription.status, PrescriptionStatus::Ready);
    }

    #[rstest]
    fn it_should_refuse_a_negative_stored_size(mut prescription_row: PrescriptionRow) {
        prescription_row.size_bytes = -1;
        let result = Prescription::try_from(prescription_row);
        assert!(matches!(result, Err(RecordsError::Backend(_))));
    }
}
