// storage/src/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use uuid::Uuid;

use hospital_models::{
    Appointment, AppointmentStatus, AuditEvent, ClinicalHistory, Department, Diagnosis, Disease,
    Employee, Equipment, EquipmentStatus, HospitalResult, InventoryRecord, Medication, Patient,
    Person, Prescription, Site, Specialty,
};

use crate::types::{
    AppointmentFilter, AppointmentUpdate, ClinicianConsultationsRow, DashboardQuery,
    DashboardStats, DiseaseStatsRow, HistoryFilter, MedicationUsageRow, PrescriptionFilter,
};

/// Persistence boundary for the whole system. Every multi-step invariant is
/// a single method here, so any backend has to execute it as one atomic
/// unit: the (clinician, time) uniqueness check lives inside
/// `insert_appointment`/`update_appointment`, the one-history-per-appointment
/// check inside `complete_appointment`, and the stock check + decrement
/// inside `issue_prescription`. Callers cannot recreate the check-then-write
/// race from separate calls.
#[async_trait]
pub trait HospitalStore: Send + Sync + Debug {
    // ---- identity ----------------------------------------------------

    /// Inserts a person + employee pair. Fails with `Conflict` on a
    /// duplicate document number or email.
    async fn insert_employee(&self, person: Person, employee: Employee) -> HospitalResult<()>;

    async fn find_employee_by_email(&self, email: &str)
        -> HospitalResult<Option<(Person, Employee)>>;

    async fn get_employee(&self, id: Uuid) -> HospitalResult<Option<(Person, Employee)>>;

    async fn set_employee_password(&self, id: Uuid, password_hash: String) -> HospitalResult<()>;

    /// Soft delete / reactivation. The row itself is never removed.
    async fn set_employee_active(&self, id: Uuid, active: bool) -> HospitalResult<()>;

    /// Active employees holding the Doctor role, optionally narrowed by
    /// site and department.
    async fn list_clinicians(
        &self,
        site: Option<Uuid>,
        department: Option<Uuid>,
    ) -> HospitalResult<Vec<(Person, Employee)>>;

    // ---- patients ----------------------------------------------------

    /// Inserts a person + patient pair, assigning the generated intake
    /// code. Fails with `Conflict` on a duplicate document number or email.
    async fn insert_patient(&self, person: Person, patient: Patient) -> HospitalResult<Patient>;

    async fn get_patient(&self, person_id: Uuid) -> HospitalResult<Option<(Person, Patient)>>;

    /// Case-insensitive match against name and document number.
    async fn list_patients(&self, search: Option<&str>)
        -> HospitalResult<Vec<(Person, Patient)>>;

    // ---- lookup registry ---------------------------------------------

    async fn insert_site(&self, site: Site) -> HospitalResult<()>;
    async fn get_site(&self, id: Uuid) -> HospitalResult<Option<Site>>;
    async fn list_sites(&self) -> HospitalResult<Vec<Site>>;

    async fn insert_department(&self, department: Department) -> HospitalResult<()>;
    async fn get_department(&self, id: Uuid) -> HospitalResult<Option<Department>>;
    async fn list_departments(&self, site: Option<Uuid>) -> HospitalResult<Vec<Department>>;

    async fn insert_specialty(&self, specialty: Specialty) -> HospitalResult<()>;
    async fn list_specialties(&self) -> HospitalResult<Vec<Specialty>>;

    async fn insert_medication(&self, medication: Medication) -> HospitalResult<()>;
    async fn get_medication(&self, id: Uuid) -> HospitalResult<Option<Medication>>;
    async fn list_medications(&self) -> HospitalResult<Vec<Medication>>;

    async fn insert_disease(&self, disease: Disease) -> HospitalResult<()>;
    async fn get_disease(&self, id: Uuid) -> HospitalResult<Option<Disease>>;
    async fn list_diseases(&self) -> HospitalResult<Vec<Disease>>;

    // ---- appointments ------------------------------------------------

    /// Conflict-checked insert: fails with `Conflict` when the clinician
    /// already has a non-cancelled appointment at the same instant.
    async fn insert_appointment(&self, appointment: Appointment) -> HospitalResult<()>;

    /// Re-validates the uniqueness constraint excluding the edited row.
    /// Fails with `Conflict` when the appointment is in a terminal state.
    async fn update_appointment(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> HospitalResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> HospitalResult<Option<Appointment>>;

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> HospitalResult<Vec<Appointment>>;

    /// SCHEDULED -> CANCELLED. Already-cancelled rows are a safe no-op;
    /// completed rows fail with `Conflict`.
    async fn cancel_appointment(&self, id: Uuid) -> HospitalResult<AppointmentStatus>;

    /// Atomically writes the clinical history + diagnosis and transitions
    /// the appointment to COMPLETED. Fails with `Conflict` when a history
    /// already exists for the appointment or the row is terminal.
    async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        history: ClinicalHistory,
        diagnosis: Diagnosis,
    ) -> HospitalResult<ClinicalHistory>;

    // ---- clinical histories ------------------------------------------

    async fn get_history(&self, id: Uuid) -> HospitalResult<Option<ClinicalHistory>>;

    async fn get_history_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> HospitalResult<Option<ClinicalHistory>>;

    async fn list_histories(&self, filter: &HistoryFilter)
        -> HospitalResult<Vec<ClinicalHistory>>;

    async fn diagnoses_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> HospitalResult<Vec<Diagnosis>>;

    async fn prescriptions_for_history(
        &self,
        history_id: Uuid,
    ) -> HospitalResult<Vec<Prescription>>;

    // ---- pharmacy ----------------------------------------------------

    /// Atomic issuance: checks stock of (site, medication), fails with
    /// `InsufficientStock` without any partial effect, otherwise decrements
    /// stock, stamps the inventory timestamp, and inserts the prescription
    /// as one unit.
    async fn issue_prescription(
        &self,
        prescription: Prescription,
        site_id: Uuid,
    ) -> HospitalResult<Prescription>;

    async fn list_prescriptions(
        &self,
        filter: &PrescriptionFilter,
    ) -> HospitalResult<Vec<Prescription>>;

    /// Creates or replaces the stock row for (site, medication).
    async fn upsert_inventory(
        &self,
        site_id: Uuid,
        medication_id: Uuid,
        stock: u32,
    ) -> HospitalResult<InventoryRecord>;

    async fn set_stock(&self, inventory_id: Uuid, stock: u32) -> HospitalResult<InventoryRecord>;

    async fn get_inventory(
        &self,
        site_id: Uuid,
        medication_id: Uuid,
    ) -> HospitalResult<Option<InventoryRecord>>;

    async fn list_inventory(&self, site: Option<Uuid>) -> HospitalResult<Vec<InventoryRecord>>;

    // ---- equipment ---------------------------------------------------

    async fn insert_equipment(&self, equipment: Equipment) -> HospitalResult<()>;
    async fn get_equipment(&self, id: Uuid) -> HospitalResult<Option<Equipment>>;
    async fn list_equipment(&self, site: Option<Uuid>) -> HospitalResult<Vec<Equipment>>;

    /// Transition-checked status update; `maintenance_date` is stamped when
    /// provided. Decommissioned rows reject every transition.
    async fn set_equipment_status(
        &self,
        id: Uuid,
        status: EquipmentStatus,
        maintenance_date: Option<NaiveDate>,
    ) -> HospitalResult<Equipment>;

    // ---- audit -------------------------------------------------------

    async fn append_audit(&self, event: AuditEvent) -> HospitalResult<()>;

    /// Newest first, bounded.
    async fn list_audit(&self, limit: usize) -> HospitalResult<Vec<AuditEvent>>;

    // ---- reporting aggregates ----------------------------------------

    async fn top_medications(&self, site: Option<Uuid>)
        -> HospitalResult<Vec<MedicationUsageRow>>;

    async fn clinician_consultations(
        &self,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<ClinicianConsultationsRow>>;

    async fn disease_stats(&self, site: Option<Uuid>) -> HospitalResult<Vec<DiseaseStatsRow>>;

    async fn dashboard_stats(
        &self,
        site: Option<Uuid>,
        query: DashboardQuery,
    ) -> HospitalResult<DashboardStats>;
}
