use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::modules::care_records::core::appointment::UnknownStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Preparing,
    Ready,
    Delivered,
}

impl PrescriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrescriptionStatus::Preparing => "preparing",
            PrescriptionStatus::Ready => "ready",
            PrescriptionStatus::Delivered => "delivered",
        }
    }
}

impl FromStr for PrescriptionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            _ => Err(UnknownStatus {
                kind: "prescription",
                value: s.to_string(),
            }),
        }
    }
}

/// A pharmacy order created from an uploaded prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub file_name: String,
    pub size_bytes: u64,
    pub extracted_data: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub file_name: String,
    pub size_bytes: u64,
}
