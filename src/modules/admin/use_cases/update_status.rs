use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::modules::care_records::core::appointment::{
    Appointment, AppointmentKind, AppointmentStatus, UnknownStatus,
};
use crate::modules::care_records::core::ports::{
    AppointmentRepository, PrescriptionRepository, RecordsError,
};
use crate::modules::care_records::core::prescription::{Prescription, PrescriptionStatus};
use crate::modules::care_records::core::schedule::{
    ScheduleError, format_slot, is_on_grid, parse_moment,
};
use crate::shared::infrastructure::realtime::SocketManager;

pub const STATUS_UPDATED_EVENT: &str = "status_updated";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("unknown item type: {0}")]
    UnknownItemType(String),

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error("rescheduling requires new_date and new_time")]
    MissingReschedule,

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Records(#[from] RecordsError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatus {
    pub item_type: String,
    pub item_id: i64,
    pub new_status: String,
    #[serde(default)]
    pub new_date: Option<String>,
    #[serde(default)]
    pub new_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UpdatedItem {
    Appointment(Appointment),
    Prescription(Prescription),
}

pub async fn update_status(
    appointments: &dyn AppointmentRepository,
    prescriptions: &dyn PrescriptionRepository,
    notifier: &SocketManager,
    command: UpdateStatus,
) -> Result<UpdatedItem, AdminError> {
    let updated = match command.item_type.trim() {
        "appointment" => {
            let status: AppointmentStatus = command.new_status.parse()?;
            let reschedule_to = match status {
                AppointmentStatus::Rescheduled => {
                    let moment = match (command.new_date.as_deref(), command.new_time.as_deref())
                    {
                        (Some(date), Some(time)) => parse_moment(date, time)?,
                        _ => return Err(AdminError::MissingReschedule),
                    };
                    let current = appointments.find_by_id(command.item_id).await?.ok_or(
                        RecordsError::NotFound {
                            kind: "appointment",
                            id: command.item_id,
                        },
                    )?;
                    if current.kind == AppointmentKind::Consultation && !is_on_grid(moment.time())
                    {
                        return Err(ScheduleError::OffGrid(format_slot(moment.time())).into());
                    }
                    Some(moment)
                }
                _ => None,
            };
            UpdatedItem::Appointment(
                appointments
                    .update_status(command.item_id, status, reschedule_to)
                    .await?,
            )
        }
        "prescription" => {
            let status: PrescriptionStatus = command.new_status.parse()?;
            UpdatedItem::Prescription(
                prescriptions
                    .update_status(command.item_id, status)
                    .await?,
            )
        }
        other => return Err(AdminError::UnknownItemType(other.to_string())),
    };

    tracing::info!(
        item_type = %command.item_type,
        item_id = command.item_id,
        status = %command.new_status,
        "status updated"
    );
    notifier.emit(
        STATUS_UPDATED_EVENT,
        json!({
            "item_type": command.item_type.trim(),
            "item_id": command.item_id,
            "status": command.new_status.trim().to_ascii_lowercase(),
        }),
    );
    Ok(updated)
}
