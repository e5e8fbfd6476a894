// storage/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hospital_models::{AppointmentStatus, ServiceType};

/// Row filter for appointment listings. Services build one from the caller's
/// scope; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub site: Option<Uuid>,
    pub clinician: Option<Uuid>,
    pub patient: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

/// Row filter for clinical history listings. Site and clinician constraints
/// are resolved through the owning appointment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub site: Option<Uuid>,
    pub clinician: Option<Uuid>,
    pub patient: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrescriptionFilter {
    pub site: Option<Uuid>,
    pub clinician: Option<Uuid>,
    pub patient: Option<Uuid>,
}

/// Field set for editing a scheduled appointment. Status and requested-at
/// are not editable; status changes go through the lifecycle operations.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentUpdate {
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub department_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub reason: Option<String>,
}

/// Aggregate row: prescriptions of one medication at one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationUsageRow {
    pub site_id: Uuid,
    pub site_name: String,
    pub medication_id: Uuid,
    pub medication_name: String,
    pub prescription_count: u64,
    pub total_quantity: u64,
}

/// Aggregate row: completed consultations per clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicianConsultationsRow {
    pub employee_id: Uuid,
    pub clinician_name: String,
    pub site_name: String,
    pub department_name: Option<String>,
    pub specialty_name: Option<String>,
    pub completed_consultations: u64,
}

/// Aggregate row: diagnosis frequency of one disease at one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseStatsRow {
    pub site_id: Uuid,
    pub site_name: String,
    pub disease_name: String,
    pub diagnosis_count: u64,
    pub patients_affected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub appointments_today: u64,
    pub patients_seen_today: u64,
    pub pending_appointments: u64,
    pub low_stock_alerts: u64,
}

/// Reference instant for dashboard aggregation, passed in so callers and
/// tests control the clock.
#[derive(Debug, Clone, Copy)]
pub struct DashboardQuery {
    pub now: DateTime<Utc>,
    pub low_stock_threshold: u32,
}
