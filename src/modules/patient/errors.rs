use thiserror::Error;

use crate::modules::auth::core::ports::AccountStoreError;
use crate::modules::care_records::core::ports::RecordsError;
use crate::modules::care_records::core::schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("patient {0} not found")]
    UnknownPatient(i64),

    #[error("doctor {0} not found")]
    UnknownDoctor(i64),

    #[error(transparent)]
    Records(#[from] RecordsError),

    #[error(transparent)]
    Accounts(#[from] AccountStoreError),
}
