// models/src/identity.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::HospitalError;

/// Identity document kinds accepted at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    /// Cédula de ciudadanía
    CC,
    /// Tarjeta de identidad
    TI,
    /// Pasaporte
    PA,
    /// Registro civil
    RC,
    /// Cédula de extranjería
    CE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Identity root. A person may additionally be an employee and/or a patient;
/// each extension references the person by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Employee roles. Row-scoping everywhere derives from the role: an
/// Administrator sees all sites, a Doctor only their own appointments, and
/// every other role is confined to its home site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Doctor,
    Clerk,
    Nurse,
    Auditor,
}

impl Role {
    /// Canonical display name, matching the stored role catalog.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrador",
            Role::Doctor => "Medico",
            Role::Clerk => "Administrativo",
            Role::Nurse => "Enfermero",
            Role::Auditor => "Auditor",
        }
    }

    pub fn all() -> [Role; 5] {
        [
            Role::Administrator,
            Role::Doctor,
            Role::Clerk,
            Role::Nurse,
            Role::Auditor,
        ]
    }

    pub fn can_read_audit_log(&self) -> bool {
        matches!(self, Role::Administrator | Role::Auditor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = HospitalError;

    /// Accepts both the stored Spanish catalog names and their accented or
    /// English spellings as they appear across surfaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrador" | "administrator" => Ok(Role::Administrator),
            "medico" | "médico" | "doctor" => Ok(Role::Doctor),
            "administrativo" | "clerk" => Ok(Role::Clerk),
            "enfermero" | "enfermera" | "nurse" => Ok(Role::Nurse),
            "auditor" => Ok(Role::Auditor),
            other => Err(HospitalError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// Clinical specialty catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

/// Person extension for staff. Never hard-deleted: deactivation flips
/// `active` so past appointments and audit rows keep a valid reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub person_id: Uuid,
    pub active: bool,
    pub role: Role,
    pub home_site: Uuid,
    pub department: Option<Uuid>,
    pub specialty: Option<Uuid>,
    pub password_hash: String,
    pub hired_at: DateTime<Utc>,
}

/// Person extension for patients. Created on intake, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub person_id: Uuid,
    /// Generated intake code, e.g. "PAC-42".
    pub code: String,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::Role;
    use std::str::FromStr;

    #[test]
    fn role_parses_observed_spellings() {
        assert_eq!(Role::from_str("Medico").unwrap(), Role::Doctor);
        assert_eq!(Role::from_str("Médico").unwrap(), Role::Doctor);
        assert_eq!(Role::from_str("administrator").unwrap(), Role::Administrator);
        assert_eq!(Role::from_str("Enfermero").unwrap(), Role::Nurse);
        assert!(Role::from_str("celador").is_err());
    }

    #[test]
    fn audit_log_is_admin_and_auditor_only() {
        assert!(Role::Administrator.can_read_audit_log());
        assert!(Role::Auditor.can_read_audit_log());
        assert!(!Role::Doctor.can_read_audit_log());
        assert!(!Role::Nurse.can_read_audit_log());
        assert!(!Role::Clerk.can_read_audit_log());
    }
}
