// In memory implementation of the appointment and prescription ports.
//
// Purpose
// - Back the patient and admin route groups without a database.
//
// Responsibilities
// - Assign sequential ids per record type.
// - Keep a doctor's consultation slot unique among non-cancelled appointments.

use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentKind, AppointmentStatus, NewAppointment,
};
use crate::modules::care_records::core::ports::{
    AppointmentRepository, PrescriptionRepository, RecordsError,
};
use crate::modules::care_records::core::prescription::{
    NewPrescription, Prescription, PrescriptionStatus,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct RecordsState {
    appointments: BTreeMap<i64, Appointment>,
    prescriptions: BTreeMap<i64, Prescription>,
    next_appointment_id: i64,
    next_prescription_id: i64,
}

impl RecordsState {
    fn slot_taken(&self, doctor_id: i64, at: NaiveDateTime, ignore_id: Option<i64>) -> bool {
        self.appointments.values().any(|a| {
            Some(a.id) != ignore_id
                && a.kind == AppointmentKind::Consultation
                && a.doctor_id == Some(doctor_id)
                && a.appointment_time == at
                && a.status.holds_slot()
        })
    }
}

#[derive(Default)]
pub struct InMemoryCareRecords {
    inner: RwLock<RecordsState>,
    offline: bool,
}

impl InMemoryCareRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    fn ensure_online(&self) -> Result<(), RecordsError> {
        if self.offline {
            return Err(RecordsError::Backend("Records store offline".into()));
        }
        Ok(())
    }
}

fn by_time(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by_key(|a| (a.appointment_time, a.id));
    appointments
}

#[async_trait::async_trait]
impl AppointmentRepository for InMemoryCareRecords {
    async fn book(&self, appointment: NewAppointment) -> Result<Appointment, RecordsError> {
        self.ensure_online()?;
        let mut g = self.inner.write().await;
        if let (AppointmentKind::Consultation, Some(doctor_id)) =
            (appointment.kind, appointment.doctor_id)
        {
            if g.slot_taken(doctor_id, appointment.appointment_time, None) {
                return Err(RecordsError::SlotTaken(appointment.appointment_time));
            }
        }
        g.next_appointment_id += 1;
        let stored = Appointment {
            id: g.next_appointment_id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            kind: appointment.kind,
            test_name: appointment.test_name,
            reason: appointment.reason,
            appointment_time: appointment.appointment_time,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        };
        g.appointments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, RecordsError> {
        self.ensure_online()?;
        Ok(self.inner.read().await.appointments.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, RecordsError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(by_time(g.appointments.values().cloned().collect()))
    }

    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, RecordsError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(by_time(
            g.appointments
                .values()
                .filter(|a| a.patient_id == patient_id)
                .cloned()
                .collect(),
        ))
    }

    async fn taken_slots(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<NaiveDateTime>, RecordsError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(g.appointments
            .values()
            .filter(|a| {
                a.kind == AppointmentKind::Consultation
                    && a.doctor_id == Some(doctor_id)
                    && a.appointment_time.date() == date
                    && a.status.holds_slot()
            })
            .map(|a| a.appointment_time)
            .collect())
    }

    async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        reschedule_to: Option<NaiveDateTime>,
    ) -> Result<Appointment, RecordsError> {
        self.ensure_online()?;
        let mut g = self.inner.write().await;
        let current = g
            .appointments
            .get(&id)
            .cloned()
            .ok_or(RecordsError::NotFound {
                kind: "appointment",
                id,
            })?;

        let appointment_time = reschedule_to.unwrap_or(current.appointment_time);
        if let (AppointmentKind::Consultation, Some(doctor_id)) = (current.kind, current.doctor_id) {
            if status.holds_slot() && g.slot_taken(doctor_id, appointment_time, Some(id)) {
                return Err(RecordsError::SlotTaken(appointment_time));
            }
        }

        let updated = Appointment {
            status,
            appointment_time,
            ..current
        };
        g.appointments.insert(id, updated.clone());
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl PrescriptionRepository for InMemoryCareRecords {
    async fn create(&self, prescription: NewPrescription) -> Result<Prescription, RecordsError> {
        self.ensure_online()?;
        let mut g = self.inner.write().await;
        g.next_prescription_id += 1;
        let stored = Prescription {
            id: g.next_prescription_id,
            patient_id: prescription.patient_id,
            file_name: prescription.file_name,
            size_bytes: prescription.size_bytes,
            extracted_data: None,
            status: PrescriptionStatus::Preparing,
            created_at: Utc::now(),
        };
        g.prescriptions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Prescription>, RecordsError> {
        self.ensure_online()?;
        Ok(self.inner.read().await.prescriptions.values().cloned().collect())
    }

    async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<Prescription>, RecordsError> {
        self.ensure_online()?;
        let g = self.inner.read().await;
        Ok(g.prescriptions
            .values()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: i64,
        status: PrescriptionStatus,
    ) -> Result<Prescription, RecordsError> {
        self.ensure_online()?;
        let mut g = self.inner.write().await;
        let prescription = g.prescriptions.get_mut(&id).ok_or(RecordsError::NotFound {
            kind: "prescription",
            id,
        })?;
        prescription.status = status;
        Ok(prescription.clone())
    }
}

#[cfg(test)]
mod in_memory_care_records_tests {
    use super::*;
    use crate::modules::care_records::core::schedule::{parse_date, parse_moment};
    use rstest::{fixture, rstest};

    fn consultation(doctor_id: i64, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            patient_id: 1,
            doctor_id: Some(doctor_id),
            kind: AppointmentKind::Consultation,
            test_name: None,
            reason: Some("check-up".into()),
            appointment_time: parse_moment(date, time).unwrap(),
        }
    }

    #[fixture]
    fn store() -> InMemoryCareRecords {
        InMemoryCareRecords::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_book_a_pending_appointment(store: InMemoryCareRecords) {
        let booked = store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();
        assert_eq!(booked.id, 1);
        assert_eq!(booked.status, AppointmentStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_a_double_booked_slot(store: InMemoryCareRecords) {
        store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();
        let result = store.book(consultation(2, "2026-10-16", "09:00")).await;
        assert!(matches!(result, Err(RecordsError::SlotTaken(_))));

        let other_doctor = store.book(consultation(3, "2026-10-16", "09:00")).await;
        assert!(other_doctor.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_free_the_slot_once_cancelled(store: InMemoryCareRecords) {
        let booked = store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();
        AppointmentRepository::update_status(&store, booked.id, AppointmentStatus::Cancelled, None)
            .await
            .unwrap();

        let date = parse_date("2026-10-16").unwrap();
        assert!(store.taken_slots(2, date).await.unwrap().is_empty());
        assert!(store.book(consultation(2, "2026-10-16", "09:00")).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_move_a_rescheduled_appointment(store: InMemoryCareRecords) {
        let booked = store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();
        let target = parse_moment("2026-10-17", "11:30").unwrap();

        let updated = AppointmentRepository::update_status(
            &store,
            booked.id,
            AppointmentStatus::Rescheduled,
            Some(target),
        )
        .await
        .unwrap();

        assert_eq!(updated.appointment_time, target);
        assert_eq!(updated.status, AppointmentStatus::Rescheduled);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refuse_to_reschedule_onto_a_taken_slot(store: InMemoryCareRecords) {
        let first = store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();
        store
            .book(consultation(2, "2026-10-16", "09:30"))
            .await
            .unwrap();

        let result = AppointmentRepository::update_status(
            &store,
            first.id,
            AppointmentStatus::Rescheduled,
            Some(parse_moment("2026-10-16", "09:30").unwrap()),
        )
        .await;

        assert!(matches!(result, Err(RecordsError::SlotTaken(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_list_appointments_by_time(store: InMemoryCareRecords) {
        store
            .book(consultation(2, "2026-10-16", "11:00"))
            .await
            .unwrap();
        store
            .book(consultation(2, "2026-10-16", "09:00"))
            .await
            .unwrap();

        let ids: Vec<i64> = AppointmentRepository::list_all(&store)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(
            AppointmentRepository::list_by_patient(&store, 9)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_track_prescription_status(store: InMemoryCareRecords) {
        let created = store
            .create(NewPrescription {
                patient_id: 4,
                file_name: "rx.png".into(),
                size_bytes: 1024,
            })
            .await
            .unwrap();
        assert_eq!(created.status, PrescriptionStatus::Preparing);

        let updated = PrescriptionRepository::update_status(
            &store,
            created.id,
            PrescriptionStatus::Ready,
        )
        .await
        .unwrap();
        assert_eq!(updated.status, PrescriptionStatus::Ready);
        assert_eq!(
            PrescriptionRepository::list_by_patient(&store, 4)
                .await
                .unwrap(),
            vec![updated]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_unknown_ids(store: InMemoryCareRecords) {
        let result = AppointmentRepository::update_status(
            &store,
            42,
            AppointmentStatus::Confirmed,
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(RecordsError::NotFound {
                kind: "appointment",
                id: 42
            })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_find_an_appointment_by_id(store: InMemoryCareRecords) {
        let booked = store
            .book(consultation(2, "2026-10-16", "10:00"))
            .await
            .unwrap();

        assert_eq!(store.find_by_id(booked.id).await.unwrap(), Some(booked));
        assert_eq!(store.find_by_id(99).await.unwrap(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_when_offline(mut store: InMemoryCareRecords) {
        store.toggle_offline();
        let result = PrescriptionRepository::list_all(&store).await;
        assert!(matches!(result, Err(RecordsError::Backend(_))));
    }
}
