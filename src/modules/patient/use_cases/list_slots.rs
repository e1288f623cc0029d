use serde::{Deserialize, Serialize};

use crate::modules::auth::core::account::Role;
use crate::modules::auth::core::ports::AccountRepository;
use crate::modules::care_records::core::ports::AppointmentRepository;
use crate::modules::care_records::core::schedule::{format_slot, free_slots, parse_date};
use crate::modules::patient::errors::PatientError;

#[derive(Debug, Clone, Deserialize)]
pub struct ListSlots {
    pub doctor_id: i64,
    pub date_str: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorView {
    pub id: i64,
    pub name: String,
}

pub async fn list_doctors(
    accounts: &dyn AccountRepository,
) -> Result<Vec<DoctorView>, PatientError> {
    Ok(accounts
        .list_by_role(Role::Doctor)
        .await?
        .into_iter()
        .map(|doctor| DoctorView {
            id: doctor.id,
            name: doctor.name,
        })
        .collect())
}

/// Free `HH:MM` slots for a doctor on one day.
pub async fn list_slots(
    accounts: &dyn AccountRepository,
    appointments: &dyn AppointmentRepository,
    query: ListSlots,
) -> Result<Vec<String>, PatientError> {
    let date = parse_date(&query.date_str)?;
    ensure_doctor(accounts, query.doctor_id).await?;
    let taken = appointments.taken_slots(query.doctor_id, date).await?;
    Ok(free_slots(date, &taken).into_iter().map(format_slot).collect())
}

pub(crate) async fn ensure_doctor(
    accounts: &dyn AccountRepository,
    doctor_id: i64,
) -> Result<(), PatientError> {
    match accounts.find_by_id(doctor_id).await? {
        Some(account) if account.role == Role::Doctor => Ok(()),
        _ => Err(PatientError::UnknownDoctor(doctor_id)),
    }
}

pub(crate) async fn ensure_patient(
    accounts: &dyn AccountRepository,
    patient_id: i64,
) -> Result<(), PatientError> {
    match accounts.find_by_id(patient_id).await? {
        Some(_) => Ok(()),
        None => Err(PatientError::UnknownPatient(patient_id)),
    }
}

#[cfg(test)]
mod list_slots_tests {
    use super::*;
    use crate::modules::auth::adapters::outbound::accounts_in_memory::InMemoryAccounts;
    use crate::modules::care_records::adapters::outbound::records_in_memory::InMemoryCareRecords;
    use crate::modules::care_records::core::appointment::{AppointmentKind, NewAppointment};
    use crate::modules::care_records::core::schedule::parse_moment;
    use crate::tests::fixtures::seed_account;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn it_should_list_only_doctors() {
        let accounts = InMemoryAccounts::new();
        seed_account(&accounts, "Pat", Role::Patient).await;
        let doctor = seed_account(&accounts, "Dr. Who", Role::Doctor).await;

        let doctors = list_doctors(&accounts).await.unwrap();

        assert_eq!(
            doctors,
            vec![DoctorView {
                id: doctor.id,
                name: "Dr. Who".into()
            }]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_hide_booked_slots() {
        let accounts = InMemoryAccounts::new();
        let patient = seed_account(&accounts, "Pat", Role::Patient).await;
        let doctor = seed_account(&accounts, "Dr. Who", Role::Doctor).await;
        let records = InMemoryCareRecords::new();
        records
            .book(NewAppointment {
                patient_id: patient.id,
                doctor_id: Some(doctor.id),
                kind: AppointmentKind::Consultation,
                test_name: None,
                reason: None,
                appointment_time: parse_moment("2026-10-16", "10:00").unwrap(),
            })
            .await
            .unwrap();

        let slots = list_slots(
            &accounts,
            &records,
            ListSlots {
                doctor_id: doctor.id,
                date_str: "2026-10-16".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(slots.len(), 15);
        assert!(!slots.contains(&"10:00".to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_non_doctor() {
        let accounts = InMemoryAccounts::new();
        let patient = seed_account(&accounts, "Pat", Role::Patient).await;

        let result = list_slots(
            &accounts,
            &InMemoryCareRecords::new(),
            ListSlots {
                doctor_id: patient.id,
                date_str: "2026-10-16".into(),
            },
        )
        .await;

        assert!(matches!(result, Err(PatientError::UnknownDoctor(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_malformed_date() {
        let result = list_slots(
            &InMemoryAccounts::new(),
            &InMemoryCareRecords::new(),
            ListSlots {
                doctor_id: 1,
                date_str: "tomorrow".into(),
            },
        )
        .await;

        assert!(matches!(result, Err(PatientError::Schedule(_))));
    }
}
