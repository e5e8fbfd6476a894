// services/src/clinical.rs
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    Appointment, AuditAction, ClinicalHistory, Diagnosis, HospitalError, HospitalResult,
    Prescription, Role,
};
use hospital_storage::HospitalStore;

use crate::audit::AuditService;
use crate::policy::{authorize, Action, AuthContext, Resource};

/// One visit inside a history detail: the appointment plus what was
/// recorded during it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitDetail {
    pub appointment: Appointment,
    pub clinician_name: String,
    pub site_name: String,
    pub department_name: Option<String>,
    pub disease_name: Option<String>,
    pub diagnosis_observation: Option<String>,
    pub prescriptions: Vec<Prescription>,
}

/// Hierarchical read: history -> visits -> diagnosis + prescriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDetail {
    pub history: ClinicalHistory,
    pub patient_name: String,
    pub patient_document: String,
    pub visits: Vec<VisitDetail>,
}

#[derive(Debug, Clone)]
pub struct ClinicalRecordService {
    store: Arc<dyn HospitalStore>,
    audit: AuditService,
}

impl ClinicalRecordService {
    pub fn new(store: Arc<dyn HospitalStore>, audit: AuditService) -> Self {
        ClinicalRecordService { store, audit }
    }

    /// Registers the diagnosis for an appointment, creating its clinical
    /// history and transitioning the appointment to COMPLETED in one store
    /// operation. Only the assigned clinician or an Administrator may do
    /// this.
    pub async fn register(
        &self,
        ctx: &AuthContext,
        appointment_id: Uuid,
        disease_id: Uuid,
        observation: Option<String>,
    ) -> HospitalResult<ClinicalHistory> {
        if !authorize(ctx, Resource::Histories, Action::Create) {
            return Err(HospitalError::NotAuthorized("register diagnosis".into()));
        }
        let appointment = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        if ctx.role != Role::Administrator && appointment.clinician_id != ctx.employee_id {
            return Err(HospitalError::NotAuthorized(
                "only the assigned clinician may complete this appointment".into(),
            ));
        }
        let disease = self
            .store
            .get_disease(disease_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("disease"))?;

        let history = ClinicalHistory {
            id: Uuid::new_v4(),
            appointment_id,
            patient_id: appointment.patient_id,
            consultation_reason: appointment.reason.clone().unwrap_or_default(),
            diagnosis_text: disease.name.clone(),
            observations: observation.clone(),
            registered_at: Utc::now(),
        };
        let diagnosis = Diagnosis {
            id: Uuid::new_v4(),
            appointment_id,
            history_id: history.id,
            disease_id,
            observation,
        };
        let history = self
            .store
            .complete_appointment(appointment_id, history, diagnosis)
            .await?;
        info!(
            "diagnosis {} registered for appointment {appointment_id}",
            disease.name
        );
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Insert,
                "clinical_histories",
                &history.id.to_string(),
                None,
            )
            .await;
        Ok(history)
    }

    /// Histories visible to the caller, per the shared scoping rule.
    pub async fn list(&self, ctx: &AuthContext) -> HospitalResult<Vec<ClinicalHistory>> {
        self.store.list_histories(&ctx.scope().history_filter()).await
    }

    pub async fn detail(
        &self,
        ctx: &AuthContext,
        history_id: Uuid,
    ) -> HospitalResult<HistoryDetail> {
        let history = self
            .store
            .get_history(history_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("clinical history"))?;
        let appointment = self
            .store
            .get_appointment(history.appointment_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        if !ctx.scope().permits_appointment(&appointment) {
            return Err(HospitalError::NotAuthorized("clinical history".into()));
        }
        let (patient_person, _) = self
            .store
            .get_patient(history.patient_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("patient"))?;

        // Every visit of this patient the caller is allowed to see, newest
        // first, each with its diagnosis and prescriptions.
        let mut filter = ctx.scope().appointment_filter();
        filter.patient = Some(history.patient_id);
        let appointments = self.store.list_appointments(&filter).await?;
        let mut visits = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let clinician_name = match self.store.get_employee(appointment.clinician_id).await? {
                Some((person, _)) => person.full_name(),
                None => String::new(),
            };
            let site_name = self
                .store
                .get_site(appointment.site_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_default();
            let department_name = self
                .store
                .get_department(appointment.department_id)
                .await?
                .map(|d| d.name);
            let diagnosis = self
                .store
                .diagnoses_for_appointment(appointment.id)
                .await?
                .into_iter()
                .next();
            let (disease_name, diagnosis_observation) = match &diagnosis {
                Some(d) => (
                    self.store.get_disease(d.disease_id).await?.map(|x| x.name),
                    d.observation.clone(),
                ),
                None => (None, None),
            };
            let prescriptions = match self
                .store
                .get_history_by_appointment(appointment.id)
                .await?
            {
                Some(h) => self.store.prescriptions_for_history(h.id).await?,
                None => Vec::new(),
            };
            visits.push(VisitDetail {
                appointment,
                clinician_name,
                site_name,
                department_name,
                disease_name,
                diagnosis_observation,
                prescriptions,
            });
        }

        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Select,
                "clinical_histories",
                &history_id.to_string(),
                None,
            )
            .await;
        Ok(HistoryDetail {
            history,
            patient_name: patient_person.full_name(),
            patient_document: patient_person.document_number,
            visits,
        })
    }
}
