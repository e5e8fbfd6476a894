// api/src/handlers.rs
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{AuditAction, CoreConfig};
use hospital_storage::HospitalStore;

use hospital_services::{
    AppointmentService, AuditService, AuthContext, ClinicalRecordService, EquipmentService,
    IdentityService, LookupService, NewAppointment, NewEquipment, NewPatient, NewPrescription,
    PasswordHasher, PatientService, PharmacyService, ReportService, UpdateAppointmentRequest,
};

use crate::payloads::{
    AppointmentListQuery, AuditLogQuery, ChangePasswordRequest, DiagnosisRequest,
    EquipmentStatusRequest, LoginRequest, PatientListQuery, ReportQuery, StockUpdateRequest,
};
use crate::response::{respond, ApiResponse};

/// The full JSON surface behind one facade. A routing layer resolves the
/// session to an `AuthContext` and dispatches here; every handler returns a
/// status + body pair.
#[derive(Debug, Clone)]
pub struct Api {
    pub identity: IdentityService,
    pub patients: PatientService,
    pub appointments: AppointmentService,
    pub clinical: ClinicalRecordService,
    pub pharmacy: PharmacyService,
    pub equipment: EquipmentService,
    pub lookup: LookupService,
    pub reports: ReportService,
    pub audit: AuditService,
    config: CoreConfig,
}

impl Api {
    /// Wires every service over one store. The server binary and the tests
    /// both bootstrap through here.
    pub fn new(
        store: Arc<dyn HospitalStore>,
        hasher: Arc<dyn PasswordHasher>,
        config: CoreConfig,
    ) -> Self {
        let audit = AuditService::new(Arc::clone(&store));
        let clinical = ClinicalRecordService::new(Arc::clone(&store), audit.clone());
        Api {
            identity: IdentityService::new(Arc::clone(&store), hasher, audit.clone()),
            patients: PatientService::new(Arc::clone(&store), audit.clone()),
            appointments: AppointmentService::new(
                Arc::clone(&store),
                audit.clone(),
                clinical.clone(),
                config.clone(),
            ),
            pharmacy: PharmacyService::new(Arc::clone(&store), audit.clone(), config.clone()),
            equipment: EquipmentService::new(Arc::clone(&store), audit.clone()),
            lookup: LookupService::new(Arc::clone(&store)),
            reports: ReportService::new(Arc::clone(&store), config.clone()),
            clinical,
            audit,
            config,
        }
    }

    // ---- session -----------------------------------------------------

    pub async fn login(&self, req: LoginRequest, origin_ip: Option<&str>) -> ApiResponse {
        respond(
            "identity",
            self.identity
                .authenticate(&req.email, &req.password, origin_ip)
                .await,
        )
    }

    pub async fn logout(&self, ctx: &AuthContext, origin_ip: Option<&str>) -> ApiResponse {
        self.identity.logout(ctx, origin_ip).await;
        ApiResponse::ok("logged_out", &true)
    }

    pub async fn profile(&self, ctx: &AuthContext) -> ApiResponse {
        respond("profile", self.identity.profile(ctx).await)
    }

    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        req: ChangePasswordRequest,
    ) -> ApiResponse {
        respond(
            "password_changed",
            self.identity
                .change_password(ctx, &req.current_password, &req.new_password)
                .await
                .map(|_| true),
        )
    }

    // ---- patients ----------------------------------------------------

    pub async fn create_patient(&self, ctx: &AuthContext, req: NewPatient) -> ApiResponse {
        match self.patients.create(ctx, req).await {
            Ok(pair) => ApiResponse::created("patient", &pair),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    pub async fn list_patients(&self, ctx: &AuthContext, query: PatientListQuery) -> ApiResponse {
        respond(
            "patients",
            self.patients.list(ctx, query.search.as_deref()).await,
        )
    }

    pub async fn patient_detail(&self, ctx: &AuthContext, patient_id: Uuid) -> ApiResponse {
        respond("patient", self.patients.detail(ctx, patient_id).await)
    }

    // ---- appointments ------------------------------------------------

    pub async fn schedule_appointment(
        &self,
        ctx: &AuthContext,
        req: NewAppointment,
    ) -> ApiResponse {
        match self.appointments.schedule(ctx, req).await {
            Ok(appointment) => ApiResponse::created("appointment", &appointment),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    pub async fn update_appointment(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: UpdateAppointmentRequest,
    ) -> ApiResponse {
        respond("appointment", self.appointments.update(ctx, id, req).await)
    }

    pub async fn cancel_appointment(&self, ctx: &AuthContext, id: Uuid) -> ApiResponse {
        respond(
            "status",
            self.appointments
                .cancel(ctx, id)
                .await
                .map(|s| s.to_string()),
        )
    }

    pub async fn complete_appointment(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: DiagnosisRequest,
    ) -> ApiResponse {
        respond(
            "history",
            self.appointments
                .complete_with_diagnosis(ctx, id, req.disease_id, req.observation)
                .await,
        )
    }

    pub async fn list_appointments(
        &self,
        ctx: &AuthContext,
        query: AppointmentListQuery,
    ) -> ApiResponse {
        respond(
            "appointments",
            self.appointments.list(ctx, query.status).await,
        )
    }

    pub async fn appointment_detail(&self, ctx: &AuthContext, id: Uuid) -> ApiResponse {
        respond("appointment", self.appointments.detail(ctx, id).await)
    }

    // ---- clinical histories ------------------------------------------

    pub async fn list_histories(&self, ctx: &AuthContext) -> ApiResponse {
        respond("histories", self.clinical.list(ctx).await)
    }

    pub async fn history_detail(&self, ctx: &AuthContext, history_id: Uuid) -> ApiResponse {
        respond("history", self.clinical.detail(ctx, history_id).await)
    }

    // ---- pharmacy ----------------------------------------------------

    pub async fn prescribe(&self, ctx: &AuthContext, req: NewPrescription) -> ApiResponse {
        match self.pharmacy.prescribe(ctx, req).await {
            Ok(prescription) => ApiResponse::created("prescription", &prescription),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    pub async fn list_prescriptions(&self, ctx: &AuthContext) -> ApiResponse {
        respond("prescriptions", self.pharmacy.list(ctx).await)
    }

    pub async fn list_inventory(&self, ctx: &AuthContext) -> ApiResponse {
        respond("inventory", self.pharmacy.inventory(ctx).await)
    }

    pub async fn low_stock(&self, ctx: &AuthContext) -> ApiResponse {
        respond("inventory", self.pharmacy.low_stock(ctx).await)
    }

    pub async fn update_stock(&self, ctx: &AuthContext, req: StockUpdateRequest) -> ApiResponse {
        respond(
            "inventory",
            self.pharmacy
                .set_stock(ctx, req.inventory_id, req.stock)
                .await,
        )
    }

    // ---- equipment ---------------------------------------------------

    pub async fn create_equipment(&self, ctx: &AuthContext, req: NewEquipment) -> ApiResponse {
        match self.equipment.create(ctx, req).await {
            Ok(equipment) => ApiResponse::created("equipment", &equipment),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    pub async fn list_equipment(&self, ctx: &AuthContext) -> ApiResponse {
        respond("equipment", self.equipment.list(ctx).await)
    }

    pub async fn equipment_detail(&self, ctx: &AuthContext, id: Uuid) -> ApiResponse {
        respond("equipment", self.equipment.detail(ctx, id).await)
    }

    pub async fn set_equipment_status(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: EquipmentStatusRequest,
    ) -> ApiResponse {
        respond(
            "equipment",
            self.equipment
                .set_status(ctx, id, req.status, req.maintenance_date)
                .await,
        )
    }

    // ---- lookups -----------------------------------------------------

    pub async fn sites(&self) -> ApiResponse {
        respond("sites", self.lookup.sites().await)
    }

    pub async fn departments(&self, site: Option<Uuid>) -> ApiResponse {
        respond("departments", self.lookup.departments(site).await)
    }

    pub async fn clinicians(&self, site: Option<Uuid>, department: Option<Uuid>) -> ApiResponse {
        respond("clinicians", self.lookup.clinicians(site, department).await)
    }

    pub async fn medications(&self) -> ApiResponse {
        respond("medications", self.lookup.medications().await)
    }

    pub async fn diseases(&self) -> ApiResponse {
        respond("diseases", self.lookup.diseases().await)
    }

    pub async fn specialties(&self) -> ApiResponse {
        respond("specialties", self.lookup.specialties().await)
    }

    pub async fn roles(&self) -> ApiResponse {
        ApiResponse::ok("roles", &self.lookup.roles())
    }

    // ---- audit & reports ---------------------------------------------

    /// Bounded by the configured page size regardless of what the caller
    /// asks for.
    pub async fn audit_log(&self, ctx: &AuthContext, query: AuditLogQuery) -> ApiResponse {
        let page = self.config.audit_page_size;
        let limit = query.limit.unwrap_or(page).min(page);
        let result = self.audit.read_log(ctx, limit).await;
        if result.is_ok() {
            self.audit
                .record(
                    Some(ctx.employee_id),
                    AuditAction::Select,
                    "audit_log",
                    "page",
                    None,
                )
                .await;
        }
        respond("events", result)
    }

    pub async fn report_top_medications(
        &self,
        ctx: &AuthContext,
        query: ReportQuery,
    ) -> ApiResponse {
        respond(
            "medication_usage",
            self.reports.top_medications(ctx, query.site_id).await,
        )
    }

    pub async fn report_clinician_consultations(
        &self,
        ctx: &AuthContext,
        query: ReportQuery,
    ) -> ApiResponse {
        respond(
            "clinician_consultations",
            self.reports
                .clinician_consultations(ctx, query.site_id)
                .await,
        )
    }

    pub async fn report_disease_stats(
        &self,
        ctx: &AuthContext,
        query: ReportQuery,
    ) -> ApiResponse {
        respond(
            "disease_stats",
            self.reports.disease_stats(ctx, query.site_id).await,
        )
    }

    pub async fn dashboard(&self, ctx: &AuthContext) -> ApiResponse {
        respond("dashboard", self.reports.dashboard(ctx).await)
    }
}
