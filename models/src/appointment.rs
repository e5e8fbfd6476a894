// models/src/appointment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::HospitalError;

/// Appointment lifecycle. `Scheduled` is the only initial state; `Completed`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// Allowed next states. Terminal states return an empty slice.
    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Scheduled => {
                &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    Consultation,
    Emergency,
    Control,
    Specialty,
}

impl FromStr for ServiceType {
    type Err = HospitalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consultation" | "consulta" => Ok(ServiceType::Consultation),
            "emergency" | "urgencia" => Ok(ServiceType::Emergency),
            "control" => Ok(ServiceType::Control),
            "specialty" | "especialidad" => Ok(ServiceType::Specialty),
            other => Err(HospitalError::validation(format!(
                "unknown service type: {other}"
            ))),
        }
    }
}

/// A scheduled visit between a patient and a clinician. Join point for
/// clinical histories and prescriptions. Never deleted: cancellation is a
/// status transition, not removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub site_id: Uuid,
    pub department_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus;

    #[test]
    fn scheduled_reaches_both_terminal_states() {
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(AppointmentStatus::Completed.valid_transitions().is_empty());
        assert!(AppointmentStatus::Cancelled.valid_transitions().is_empty());
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Scheduled));
    }
}
