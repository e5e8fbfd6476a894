// services/src/patients.rs
use chrono::{Datelike, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    Appointment, AuditAction, DocumentType, Gender, HospitalError, HospitalResult, Patient,
    Person, Prescription,
};
use hospital_storage::HospitalStore;

use crate::audit::AuditService;
use crate::policy::AuthContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
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
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub person: Person,
    pub patient: Patient,
    /// Most recent visits visible to the caller, newest first.
    pub recent_appointments: Vec<Appointment>,
    /// Prescriptions issued during those visits, newest first.
    pub prescriptions: Vec<Prescription>,
}

#[derive(Debug, Clone)]
pub struct PatientService {
    store: Arc<dyn HospitalStore>,
    audit: AuditService,
}

impl PatientService {
    pub fn new(store: Arc<dyn HospitalStore>, audit: AuditService) -> Self {
        PatientService { store, audit }
    }

    /// Patient intake. The intake code is generated by the store; a
    /// duplicate document number or email is a conflict.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: NewPatient,
    ) -> HospitalResult<(Person, Patient)> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(HospitalError::validation("first and last name are required"));
        }
        if request.document_number.trim().is_empty() {
            return Err(HospitalError::validation("document number is required"));
        }
        if !request.email.contains('@') {
            return Err(HospitalError::validation("email address is not valid"));
        }
        if let Some(birth) = request.birth_date {
            let today = Utc::now().date_naive();
            if birth > today {
                return Err(HospitalError::validation("birth date cannot be in the future"));
            }
            if today.year() - birth.year() > 120 {
                return Err(HospitalError::validation("birth date is not plausible"));
            }
        }

        let person = Person {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            document_type: request.document_type,
            document_number: request.document_number,
            email: request.email,
            birth_date: request.birth_date,
            gender: request.gender,
            address: request.address,
            phone: request.phone,
            city: request.city,
        };
        let patient = Patient {
            person_id: person.id,
            code: String::new(), // assigned by the store
            blood_type: request.blood_type,
            allergies: request.allergies,
            emergency_contact: request.emergency_contact,
            registered_at: Utc::now(),
        };
        let patient = self.store.insert_patient(person.clone(), patient).await?;
        info!("patient {} registered as {}", person.full_name(), patient.code);
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Insert,
                "patients",
                &patient.code,
                None,
            )
            .await;
        Ok((person, patient))
    }

    /// Patient directory with optional name/document search. The directory
    /// itself is not site-scoped; clinical data attached to a patient is.
    pub async fn list(
        &self,
        _ctx: &AuthContext,
        search: Option<&str>,
    ) -> HospitalResult<Vec<(Person, Patient)>> {
        self.store.list_patients(search).await
    }

    pub async fn detail(
        &self,
        ctx: &AuthContext,
        patient_id: Uuid,
    ) -> HospitalResult<PatientDetail> {
        let (person, patient) = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("patient"))?;
        // Same row visibility as the listings: a site-bound caller never
        // sees another site's visits here, nor a doctor another clinician's.
        let mut appointment_filter = ctx.scope().appointment_filter();
        appointment_filter.patient = Some(patient_id);
        let mut recent_appointments = self.store.list_appointments(&appointment_filter).await?;
        recent_appointments.truncate(10);
        let mut prescription_filter = ctx.scope().prescription_filter();
        prescription_filter.patient = Some(patient_id);
        let prescriptions = self.store.list_prescriptions(&prescription_filter).await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Select,
                "patients",
                &patient.code,
                None,
            )
            .await;
        Ok(PatientDetail {
            person,
            patient,
            recent_appointments,
            prescriptions,
        })
    }
}
