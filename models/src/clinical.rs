// models/src/clinical.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Disease catalog entry referenced by diagnoses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub id: Uuid,
    pub name: String,
}

/// The durable record created when an appointment completes. Exactly one per
/// appointment; immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalHistory {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub consultation_reason: String,
    pub diagnosis_text: String,
    pub observations: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Catalog-backed diagnosis attached to an appointment on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub history_id: Uuid,
    pub disease_id: Uuid,
    pub observation: Option<String>,
}
