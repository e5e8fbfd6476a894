// services/src/appointments.rs
use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    Appointment, AppointmentStatus, AuditAction, ClinicalHistory, CoreConfig, HospitalError,
    HospitalResult, Role, ServiceType,
};
use hospital_storage::{AppointmentUpdate, HospitalStore};

use crate::audit::AuditService;
use crate::clinical::ClinicalRecordService;
use crate::policy::AuthContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    /// Defaults to the caller's home site when absent; only an
    /// Administrator may schedule for another site.
    pub site_id: Option<Uuid>,
    pub department_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub department_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub reason: Option<String>,
}

/// Owns the visit state machine: SCHEDULED -> COMPLETED via diagnosis
/// registration, SCHEDULED -> CANCELLED via explicit cancellation, nothing
/// out of a terminal state.
#[derive(Debug, Clone)]
pub struct AppointmentService {
    store: Arc<dyn HospitalStore>,
    audit: AuditService,
    clinical: ClinicalRecordService,
    config: CoreConfig,
}

impl AppointmentService {
    pub fn new(
        store: Arc<dyn HospitalStore>,
        audit: AuditService,
        clinical: ClinicalRecordService,
        config: CoreConfig,
    ) -> Self {
        AppointmentService {
            store,
            audit,
            clinical,
            config,
        }
    }

    fn validate_when(&self, when: DateTime<Utc>, now: DateTime<Utc>) -> HospitalResult<()> {
        if when <= now {
            return Err(HospitalError::validation(
                "appointments cannot be scheduled in the past",
            ));
        }
        if when - now > Duration::days(self.config.scheduling_horizon_days) {
            return Err(HospitalError::validation(format!(
                "appointments cannot be scheduled more than {} days ahead",
                self.config.scheduling_horizon_days
            )));
        }
        Ok(())
    }

    async fn validate_refs(
        &self,
        patient_id: Uuid,
        clinician_id: Uuid,
        site_id: Uuid,
        department_id: Uuid,
    ) -> HospitalResult<()> {
        self.store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("patient"))?;
        let (_, clinician) = self
            .store
            .get_employee(clinician_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("clinician"))?;
        if clinician.role != Role::Doctor || !clinician.active {
            return Err(HospitalError::validation(
                "assigned employee is not an active clinician",
            ));
        }
        let department = self
            .store
            .get_department(department_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("department"))?;
        if department.site_id != site_id {
            return Err(HospitalError::validation(
                "department does not belong to the appointment site",
            ));
        }
        Ok(())
    }

    /// Schedules a new visit. The (clinician, time) uniqueness check runs
    /// inside the store insert, so two racing calls cannot both succeed.
    pub async fn schedule(
        &self,
        ctx: &AuthContext,
        request: NewAppointment,
    ) -> HospitalResult<Appointment> {
        let now = Utc::now();
        self.validate_when(request.scheduled_at, now)?;
        let site_id = match (ctx.role, request.site_id) {
            (Role::Administrator, Some(site)) => site,
            // Non-admins always book at their own site.
            _ => ctx.home_site,
        };
        self.validate_refs(
            request.patient_id,
            request.clinician_id,
            site_id,
            request.department_id,
        )
        .await?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            clinician_id: request.clinician_id,
            site_id,
            department_id: request.department_id,
            scheduled_at: request.scheduled_at,
            requested_at: now,
            service_type: request.service_type,
            reason: request.reason,
            status: AppointmentStatus::Scheduled,
        };
        self.store.insert_appointment(appointment.clone()).await?;
        info!(
            "appointment {} scheduled with {} at {}",
            appointment.id, appointment.clinician_id, appointment.scheduled_at
        );
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Insert,
                "appointments",
                &appointment.id.to_string(),
                None,
            )
            .await;
        Ok(appointment)
    }

    /// Edits a scheduled appointment, re-validating every constraint while
    /// excluding the edited row from the double-booking check.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> HospitalResult<Appointment> {
        let current = self.visible_appointment(ctx, id).await?;
        self.validate_when(request.scheduled_at, Utc::now())?;
        self.validate_refs(
            request.patient_id,
            request.clinician_id,
            current.site_id,
            request.department_id,
        )
        .await?;
        let updated = self
            .store
            .update_appointment(
                id,
                AppointmentUpdate {
                    patient_id: request.patient_id,
                    clinician_id: request.clinician_id,
                    department_id: request.department_id,
                    scheduled_at: request.scheduled_at,
                    service_type: request.service_type,
                    reason: request.reason,
                },
            )
            .await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Update,
                "appointments",
                &id.to_string(),
                None,
            )
            .await;
        Ok(updated)
    }

    /// SCHEDULED -> CANCELLED. Cancelling an already-cancelled appointment
    /// is a safe no-op; a completed one is a conflict.
    pub async fn cancel(&self, ctx: &AuthContext, id: Uuid) -> HospitalResult<AppointmentStatus> {
        self.visible_appointment(ctx, id).await?;
        let status = self.store.cancel_appointment(id).await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Update,
                "appointments",
                &id.to_string(),
                None,
            )
            .await;
        Ok(status)
    }

    /// Registers a diagnosis and completes the appointment; delegates to
    /// the clinical record service, which owns the history write.
    pub async fn complete_with_diagnosis(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        disease_id: Uuid,
        observation: Option<String>,
    ) -> HospitalResult<ClinicalHistory> {
        self.clinical.register(ctx, id, disease_id, observation).await
    }

    /// Appointments visible to the caller, optionally narrowed by status.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        status: Option<AppointmentStatus>,
    ) -> HospitalResult<Vec<Appointment>> {
        let mut filter = ctx.scope().appointment_filter();
        filter.status = status;
        self.store.list_appointments(&filter).await
    }

    pub async fn detail(&self, ctx: &AuthContext, id: Uuid) -> HospitalResult<Appointment> {
        self.visible_appointment(ctx, id).await
    }

    /// Fetch + scope check shared by the single-row operations, so detail
    /// reads can never return what a listing would hide.
    async fn visible_appointment(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> HospitalResult<Appointment> {
        let appointment = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        if !ctx.scope().permits_appointment(&appointment) {
            return Err(HospitalError::NotAuthorized("appointment".into()));
        }
        Ok(appointment)
    }
}
