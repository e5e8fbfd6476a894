// storage/src/memory.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use hospital_models::{
    Appointment, AppointmentStatus, AuditEvent, ClinicalHistory, Department, Diagnosis, Disease,
    Employee, Equipment, EquipmentStatus, HospitalError, HospitalResult, InventoryRecord,
    Medication, Patient, Person, Prescription, Role, Site, Specialty,
};

use crate::store::HospitalStore;
use crate::types::{
    AppointmentFilter, AppointmentUpdate, ClinicianConsultationsRow, DashboardQuery,
    DashboardStats, DiseaseStatsRow, HistoryFilter, MedicationUsageRow, PrescriptionFilter,
};

#[derive(Debug, Default)]
struct State {
    persons: HashMap<Uuid, Person>,
    employees: HashMap<Uuid, Employee>,
    patients: HashMap<Uuid, Patient>,
    patient_seq: u64,
    sites: HashMap<Uuid, Site>,
    departments: HashMap<Uuid, Department>,
    specialties: HashMap<Uuid, Specialty>,
    medications: HashMap<Uuid, Medication>,
    diseases: HashMap<Uuid, Disease>,
    appointments: HashMap<Uuid, Appointment>,
    histories: HashMap<Uuid, ClinicalHistory>,
    diagnoses: HashMap<Uuid, Diagnosis>,
    prescriptions: HashMap<Uuid, Prescription>,
    // Keyed by (site, medication): one stock row per pair.
    inventory: HashMap<(Uuid, Uuid), InventoryRecord>,
    equipment: HashMap<Uuid, Equipment>,
    audit_log: Vec<AuditEvent>,
}

impl State {
    fn duplicate_identity(&self, person: &Person) -> bool {
        self.persons.values().any(|p| {
            p.id != person.id
                && (p.document_number == person.document_number
                    || p.email.eq_ignore_ascii_case(&person.email))
        })
    }

    fn appointment_slot_taken(
        &self,
        clinician_id: Uuid,
        when: chrono::DateTime<chrono::Utc>,
        exclude: Option<Uuid>,
    ) -> bool {
        self.appointments.values().any(|a| {
            a.clinician_id == clinician_id
                && a.scheduled_at == when
                && a.status != AppointmentStatus::Cancelled
                && Some(a.id) != exclude
        })
    }

    fn appointment_site(&self, appointment_id: Uuid) -> Option<Uuid> {
        self.appointments.get(&appointment_id).map(|a| a.site_id)
    }

    fn appointment_clinician(&self, appointment_id: Uuid) -> Option<Uuid> {
        self.appointments
            .get(&appointment_id)
            .map(|a| a.clinician_id)
    }
}

/// Single-lock in-memory backend. One `RwLock` over the whole state makes
/// every trait method an atomic unit, which is the contract the trait
/// demands of real backends via transactions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

#[async_trait]
impl HospitalStore for InMemoryStore {
    // ---- identity ----------------------------------------------------

    async fn insert_employee(&self, person: Person, employee: Employee) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        if state.duplicate_identity(&person) {
            return Err(HospitalError::conflict(
                "document number or email already registered",
            ));
        }
        info!("registering employee {} ({})", person.full_name(), employee.role);
        state.persons.insert(person.id, person);
        state.employees.insert(employee.person_id, employee);
        Ok(())
    }

    async fn find_employee_by_email(
        &self,
        email: &str,
    ) -> HospitalResult<Option<(Person, Employee)>> {
        let state = self.state.read().await;
        Ok(state
            .persons
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .and_then(|p| {
                state
                    .employees
                    .get(&p.id)
                    .map(|e| (p.clone(), e.clone()))
            }))
    }

    async fn get_employee(&self, id: Uuid) -> HospitalResult<Option<(Person, Employee)>> {
        let state = self.state.read().await;
        Ok(state
            .employees
            .get(&id)
            .and_then(|e| state.persons.get(&id).map(|p| (p.clone(), e.clone()))))
    }

    async fn set_employee_password(&self, id: Uuid, password_hash: String) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        let employee = state
            .employees
            .get_mut(&id)
            .ok_or_else(|| HospitalError::not_found("employee"))?;
        employee.password_hash = password_hash;
        Ok(())
    }

    async fn set_employee_active(&self, id: Uuid, active: bool) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        let employee = state
            .employees
            .get_mut(&id)
            .ok_or_else(|| HospitalError::not_found("employee"))?;
        employee.active = active;
        Ok(())
    }

    async fn list_clinicians(
        &self,
        site: Option<Uuid>,
        department: Option<Uuid>,
    ) -> HospitalResult<Vec<(Person, Employee)>> {
        let state = self.state.read().await;
        let mut rows: Vec<(Person, Employee)> = state
            .employees
            .values()
            .filter(|e| e.role == Role::Doctor && e.active)
            .filter(|e| site.map_or(true, |s| e.home_site == s))
            .filter(|e| department.map_or(true, |d| e.department == Some(d)))
            .filter_map(|e| state.persons.get(&e.person_id).map(|p| (p.clone(), e.clone())))
            .collect();
        rows.sort_by(|(a, _), (b, _)| a.full_name().cmp(&b.full_name()));
        Ok(rows)
    }

    // ---- patients ----------------------------------------------------

    async fn insert_patient(&self, person: Person, patient: Patient) -> HospitalResult<Patient> {
        let mut state = self.state.write().await;
        if state.duplicate_identity(&person) {
            return Err(HospitalError::conflict(
                "document number or email already registered",
            ));
        }
        state.patient_seq += 1;
        let mut patient = patient;
        patient.code = format!("PAC-{}", state.patient_seq);
        info!("patient intake {} as {}", person.full_name(), patient.code);
        state.persons.insert(person.id, person);
        state.patients.insert(patient.person_id, patient.clone());
        Ok(patient)
    }

    async fn get_patient(&self, person_id: Uuid) -> HospitalResult<Option<(Person, Patient)>> {
        let state = self.state.read().await;
        Ok(state
            .patients
            .get(&person_id)
            .and_then(|pt| state.persons.get(&person_id).map(|p| (p.clone(), pt.clone()))))
    }

    async fn list_patients(
        &self,
        search: Option<&str>,
    ) -> HospitalResult<Vec<(Person, Patient)>> {
        let state = self.state.read().await;
        let needle = search.map(|s| s.to_lowercase());
        let mut rows: Vec<(Person, Patient)> = state
            .patients
            .values()
            .filter_map(|pt| state.persons.get(&pt.person_id).map(|p| (p.clone(), pt.clone())))
            .filter(|(p, _)| match &needle {
                Some(n) => {
                    p.full_name().to_lowercase().contains(n)
                        || p.document_number.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();
        rows.sort_by(|(a, _), (b, _)| a.full_name().cmp(&b.full_name()));
        Ok(rows)
    }

    // ---- lookup registry ---------------------------------------------

    async fn insert_site(&self, site: Site) -> HospitalResult<()> {
        self.state.write().await.sites.insert(site.id, site);
        Ok(())
    }

    async fn get_site(&self, id: Uuid) -> HospitalResult<Option<Site>> {
        Ok(self.state.read().await.sites.get(&id).cloned())
    }

    async fn list_sites(&self) -> HospitalResult<Vec<Site>> {
        let state = self.state.read().await;
        let mut sites: Vec<Site> = state.sites.values().cloned().collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sites)
    }

    async fn insert_department(&self, department: Department) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        if !state.sites.contains_key(&department.site_id) {
            return Err(HospitalError::not_found("site"));
        }
        state.departments.insert(department.id, department);
        Ok(())
    }

    async fn get_department(&self, id: Uuid) -> HospitalResult<Option<Department>> {
        Ok(self.state.read().await.departments.get(&id).cloned())
    }

    async fn list_departments(&self, site: Option<Uuid>) -> HospitalResult<Vec<Department>> {
        let state = self.state.read().await;
        let mut rows: Vec<Department> = state
            .departments
            .values()
            .filter(|d| site.map_or(true, |s| d.site_id == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_specialty(&self, specialty: Specialty) -> HospitalResult<()> {
        self.state.write().await.specialties.insert(specialty.id, specialty);
        Ok(())
    }

    async fn list_specialties(&self) -> HospitalResult<Vec<Specialty>> {
        let state = self.state.read().await;
        let mut rows: Vec<Specialty> = state.specialties.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_medication(&self, medication: Medication) -> HospitalResult<()> {
        self.state.write().await.medications.insert(medication.id, medication);
        Ok(())
    }

    async fn get_medication(&self, id: Uuid) -> HospitalResult<Option<Medication>> {
        Ok(self.state.read().await.medications.get(&id).cloned())
    }

    async fn list_medications(&self) -> HospitalResult<Vec<Medication>> {
        let state = self.state.read().await;
        let mut rows: Vec<Medication> = state.medications.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_disease(&self, disease: Disease) -> HospitalResult<()> {
        self.state.write().await.diseases.insert(disease.id, disease);
        Ok(())
    }

    async fn get_disease(&self, id: Uuid) -> HospitalResult<Option<Disease>> {
        Ok(self.state.read().await.diseases.get(&id).cloned())
    }

    async fn list_diseases(&self) -> HospitalResult<Vec<Disease>> {
        let state = self.state.read().await;
        let mut rows: Vec<Disease> = state.diseases.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    // ---- appointments ------------------------------------------------

    async fn insert_appointment(&self, appointment: Appointment) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        if state.appointment_slot_taken(
            appointment.clinician_id,
            appointment.scheduled_at,
            None,
        ) {
            return Err(HospitalError::conflict(
                "clinician already booked at that time",
            ));
        }
        debug!(
            "appointment {} scheduled for {}",
            appointment.id, appointment.scheduled_at
        );
        state.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        update: AppointmentUpdate,
    ) -> HospitalResult<Appointment> {
        let mut state = self.state.write().await;
        let current = state
            .appointments
            .get(&id)
            .ok_or_else(|| HospitalError::not_found("appointment"))?
            .clone();
        if current.status.is_terminal() {
            return Err(HospitalError::conflict(format!(
                "appointment is {}",
                current.status
            )));
        }
        if state.appointment_slot_taken(update.clinician_id, update.scheduled_at, Some(id)) {
            return Err(HospitalError::conflict(
                "clinician already booked at that time",
            ));
        }
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        appointment.patient_id = update.patient_id;
        appointment.clinician_id = update.clinician_id;
        appointment.department_id = update.department_id;
        appointment.scheduled_at = update.scheduled_at;
        appointment.service_type = update.service_type;
        appointment.reason = update.reason;
        Ok(appointment.clone())
    }

    async fn get_appointment(&self, id: Uuid) -> HospitalResult<Option<Appointment>> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> HospitalResult<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut rows: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| filter.site.map_or(true, |s| a.site_id == s))
            .filter(|a| filter.clinician.map_or(true, |c| a.clinician_id == c))
            .filter(|a| filter.patient.map_or(true, |p| a.patient_id == p))
            .filter(|a| filter.status.map_or(true, |st| a.status == st))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(rows)
    }

    async fn cancel_appointment(&self, id: Uuid) -> HospitalResult<AppointmentStatus> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        match appointment.status {
            AppointmentStatus::Scheduled => {
                appointment.status = AppointmentStatus::Cancelled;
                info!("appointment {id} cancelled");
                Ok(AppointmentStatus::Cancelled)
            }
            // Cancelling twice is a safe no-op.
            AppointmentStatus::Cancelled => Ok(AppointmentStatus::Cancelled),
            AppointmentStatus::Completed => Err(HospitalError::conflict(
                "completed appointments cannot be cancelled",
            )),
        }
    }

    async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        history: ClinicalHistory,
        diagnosis: Diagnosis,
    ) -> HospitalResult<ClinicalHistory> {
        let mut state = self.state.write().await;
        let status = state
            .appointments
            .get(&appointment_id)
            .map(|a| a.status)
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        let already_recorded = state
            .histories
            .values()
            .any(|h| h.appointment_id == appointment_id);
        if already_recorded || status == AppointmentStatus::Completed {
            return Err(HospitalError::conflict("appointment already completed"));
        }
        if status == AppointmentStatus::Cancelled {
            return Err(HospitalError::conflict(
                "cancelled appointments cannot be completed",
            ));
        }
        state.histories.insert(history.id, history.clone());
        state.diagnoses.insert(diagnosis.id, diagnosis);
        if let Some(appointment) = state.appointments.get_mut(&appointment_id) {
            appointment.status = AppointmentStatus::Completed;
        }
        info!("appointment {appointment_id} completed, history {}", history.id);
        Ok(history)
    }

    // ---- clinical histories ------------------------------------------

    async fn get_history(&self, id: Uuid) -> HospitalResult<Option<ClinicalHistory>> {
        Ok(self.state.read().await.histories.get(&id).cloned())
    }

    async fn get_history_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> HospitalResult<Option<ClinicalHistory>> {
        let state = self.state.read().await;
        Ok(state
            .histories
            .values()
            .find(|h| h.appointment_id == appointment_id)
            .cloned())
    }

    async fn list_histories(
        &self,
        filter: &HistoryFilter,
    ) -> HospitalResult<Vec<ClinicalHistory>> {
        let state = self.state.read().await;
        let mut rows: Vec<ClinicalHistory> = state
            .histories
            .values()
            .filter(|h| filter.patient.map_or(true, |p| h.patient_id == p))
            .filter(|h| {
                filter
                    .site
                    .map_or(true, |s| state.appointment_site(h.appointment_id) == Some(s))
            })
            .filter(|h| {
                filter.clinician.map_or(true, |c| {
                    state.appointment_clinician(h.appointment_id) == Some(c)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(rows)
    }

    async fn diagnoses_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> HospitalResult<Vec<Diagnosis>> {
        let state = self.state.read().await;
        Ok(state
            .diagnoses
            .values()
            .filter(|d| d.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    async fn prescriptions_for_history(
        &self,
        history_id: Uuid,
    ) -> HospitalResult<Vec<Prescription>> {
        let state = self.state.read().await;
        let mut rows: Vec<Prescription> = state
            .prescriptions
            .values()
            .filter(|p| p.history_id == history_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.issued_on.cmp(&b.issued_on));
        Ok(rows)
    }

    // ---- pharmacy ----------------------------------------------------

    async fn issue_prescription(
        &self,
        prescription: Prescription,
        site_id: Uuid,
    ) -> HospitalResult<Prescription> {
        let mut state = self.state.write().await;
        let key = (site_id, prescription.medication_id);
        let record = state
            .inventory
            .get_mut(&key)
            .ok_or_else(|| HospitalError::not_found("inventory record"))?;
        if prescription.quantity > record.stock {
            return Err(HospitalError::InsufficientStock {
                requested: prescription.quantity,
                available: record.stock,
            });
        }
        record.stock -= prescription.quantity;
        record.updated_at = chrono::Utc::now();
        info!(
            "issued {} x{} at site {site_id}, stock now {}",
            prescription.medication_id, prescription.quantity, record.stock
        );
        state
            .prescriptions
            .insert(prescription.id, prescription.clone());
        Ok(prescription)
    }

    async fn list_prescriptions(
        &self,
        filter: &PrescriptionFilter,
    ) -> HospitalResult<Vec<Prescription>> {
        let state = self.state.read().await;
        let mut rows: Vec<Prescription> = state
            .prescriptions
            .values()
            .filter(|p| {
                filter
                    .site
                    .map_or(true, |s| state.appointment_site(p.appointment_id) == Some(s))
            })
            .filter(|p| {
                filter.clinician.map_or(true, |c| {
                    state.appointment_clinician(p.appointment_id) == Some(c)
                })
            })
            .filter(|p| {
                filter.patient.map_or(true, |pid| {
                    state
                        .histories
                        .get(&p.history_id)
                        .map_or(false, |h| h.patient_id == pid)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.issued_on.cmp(&a.issued_on));
        Ok(rows)
    }

    async fn upsert_inventory(
        &self,
        site_id: Uuid,
        medication_id: Uuid,
        stock: u32,
    ) -> HospitalResult<InventoryRecord> {
        let mut state = self.state.write().await;
        if !state.sites.contains_key(&site_id) {
            return Err(HospitalError::not_found("site"));
        }
        if !state.medications.contains_key(&medication_id) {
            return Err(HospitalError::not_found("medication"));
        }
        let record = state
            .inventory
            .entry((site_id, medication_id))
            .or_insert_with(|| InventoryRecord {
                id: Uuid::new_v4(),
                site_id,
                medication_id,
                stock: 0,
                updated_at: chrono::Utc::now(),
            });
        record.stock = stock;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }

    async fn set_stock(&self, inventory_id: Uuid, stock: u32) -> HospitalResult<InventoryRecord> {
        let mut state = self.state.write().await;
        let record = state
            .inventory
            .values_mut()
            .find(|r| r.id == inventory_id)
            .ok_or_else(|| HospitalError::not_found("inventory record"))?;
        record.stock = stock;
        record.updated_at = chrono::Utc::now();
        Ok(record.clone())
    }

    async fn get_inventory(
        &self,
        site_id: Uuid,
        medication_id: Uuid,
    ) -> HospitalResult<Option<InventoryRecord>> {
        let state = self.state.read().await;
        Ok(state.inventory.get(&(site_id, medication_id)).cloned())
    }

    async fn list_inventory(&self, site: Option<Uuid>) -> HospitalResult<Vec<InventoryRecord>> {
        let state = self.state.read().await;
        let mut rows: Vec<InventoryRecord> = state
            .inventory
            .values()
            .filter(|r| site.map_or(true, |s| r.site_id == s))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.stock);
        Ok(rows)
    }

    // ---- equipment ---------------------------------------------------

    async fn insert_equipment(&self, equipment: Equipment) -> HospitalResult<()> {
        let mut state = self.state.write().await;
        if !state.departments.contains_key(&equipment.department_id) {
            return Err(HospitalError::not_found("department"));
        }
        state.equipment.insert(equipment.id, equipment);
        Ok(())
    }

    async fn get_equipment(&self, id: Uuid) -> HospitalResult<Option<Equipment>> {
        Ok(self.state.read().await.equipment.get(&id).cloned())
    }

    async fn list_equipment(&self, site: Option<Uuid>) -> HospitalResult<Vec<Equipment>> {
        let state = self.state.read().await;
        let mut rows: Vec<Equipment> = state
            .equipment
            .values()
            .filter(|e| site.map_or(true, |s| e.site_id == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn set_equipment_status(
        &self,
        id: Uuid,
        status: EquipmentStatus,
        maintenance_date: Option<NaiveDate>,
    ) -> HospitalResult<Equipment> {
        let mut state = self.state.write().await;
        let equipment = state
            .equipment
            .get_mut(&id)
            .ok_or_else(|| HospitalError::not_found("equipment"))?;
        if !equipment.status.can_transition_to(status) {
            return Err(HospitalError::conflict(format!(
                "equipment is {}",
                equipment.status
            )));
        }
        equipment.status = status;
        if let Some(date) = maintenance_date {
            equipment.last_maintenance = Some(date);
        }
        Ok(equipment.clone())
    }

    // ---- audit -------------------------------------------------------

    async fn append_audit(&self, event: AuditEvent) -> HospitalResult<()> {
        self.state.write().await.audit_log.push(event);
        Ok(())
    }

    async fn list_audit(&self, limit: usize) -> HospitalResult<Vec<AuditEvent>> {
        let state = self.state.read().await;
        let mut rows = state.audit_log.clone();
        rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        rows.truncate(limit);
        Ok(rows)
    }

    // ---- reporting aggregates ----------------------------------------

    async fn top_medications(
        &self,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<MedicationUsageRow>> {
        let state = self.state.read().await;
        let mut buckets: HashMap<(Uuid, Uuid), (u64, u64)> = HashMap::new();
        for p in state.prescriptions.values() {
            let Some(site_id) = state.appointment_site(p.appointment_id) else {
                continue;
            };
            if site.map_or(false, |s| site_id != s) {
                continue;
            }
            let entry = buckets.entry((site_id, p.medication_id)).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += u64::from(p.quantity);
        }
        let mut rows: Vec<MedicationUsageRow> = buckets
            .into_iter()
            .filter_map(|((site_id, medication_id), (count, quantity))| {
                let site_name = state.sites.get(&site_id)?.name.clone();
                let medication_name = state.medications.get(&medication_id)?.name.clone();
                Some(MedicationUsageRow {
                    site_id,
                    site_name,
                    medication_id,
                    medication_name,
                    prescription_count: count,
                    total_quantity: quantity,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(b.prescription_count.cmp(&a.prescription_count))
        });
        Ok(rows)
    }

    async fn clinician_consultations(
        &self,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<ClinicianConsultationsRow>> {
        let state = self.state.read().await;
        let mut buckets: HashMap<Uuid, u64> = HashMap::new();
        for a in state.appointments.values() {
            if a.status != AppointmentStatus::Completed {
                continue;
            }
            if site.map_or(false, |s| a.site_id != s) {
                continue;
            }
            *buckets.entry(a.clinician_id).or_insert(0) += 1;
        }
        let mut rows: Vec<ClinicianConsultationsRow> = buckets
            .into_iter()
            .filter_map(|(employee_id, count)| {
                let employee = state.employees.get(&employee_id)?;
                let person = state.persons.get(&employee_id)?;
                let site_name = state.sites.get(&employee.home_site)?.name.clone();
                let department_name = employee
                    .department
                    .and_then(|d| state.departments.get(&d))
                    .map(|d| d.name.clone());
                let specialty_name = employee
                    .specialty
                    .and_then(|s| state.specialties.get(&s))
                    .map(|s| s.name.clone());
                Some(ClinicianConsultationsRow {
                    employee_id,
                    clinician_name: person.full_name(),
                    site_name,
                    department_name,
                    specialty_name,
                    completed_consultations: count,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.completed_consultations
                .cmp(&a.completed_consultations)
                .then(a.clinician_name.cmp(&b.clinician_name))
        });
        Ok(rows)
    }

    async fn disease_stats(&self, site: Option<Uuid>) -> HospitalResult<Vec<DiseaseStatsRow>> {
        let state = self.state.read().await;
        let mut buckets: HashMap<(Uuid, Uuid), (u64, HashSet<Uuid>)> = HashMap::new();
        for d in state.diagnoses.values() {
            let Some(appointment) = state.appointments.get(&d.appointment_id) else {
                continue;
            };
            if site.map_or(false, |s| appointment.site_id != s) {
                continue;
            }
            let entry = buckets
                .entry((appointment.site_id, d.disease_id))
                .or_insert_with(|| (0, HashSet::new()));
            entry.0 += 1;
            entry.1.insert(appointment.patient_id);
        }
        let mut rows: Vec<DiseaseStatsRow> = buckets
            .into_iter()
            .filter_map(|((site_id, disease_id), (count, patients))| {
                let site_name = state.sites.get(&site_id)?.name.clone();
                let disease_name = state.diseases.get(&disease_id)?.name.clone();
                Some(DiseaseStatsRow {
                    site_id,
                    site_name,
                    disease_name,
                    diagnosis_count: count,
                    patients_affected: patients.len() as u64,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.diagnosis_count
                .cmp(&a.diagnosis_count)
                .then(b.patients_affected.cmp(&a.patients_affected))
        });
        Ok(rows)
    }

    async fn dashboard_stats(
        &self,
        site: Option<Uuid>,
        query: DashboardQuery,
    ) -> HospitalResult<DashboardStats> {
        let state = self.state.read().await;
        let today = query.now.date_naive();
        let in_site = |site_id: Uuid| site.map_or(true, |s| site_id == s);

        let appointments_today = state
            .appointments
            .values()
            .filter(|a| in_site(a.site_id) && a.scheduled_at.date_naive() == today)
            .count() as u64;
        let patients_seen_today = state
            .appointments
            .values()
            .filter(|a| {
                in_site(a.site_id)
                    && a.status == AppointmentStatus::Completed
                    && a.scheduled_at.date_naive() == today
            })
            .count() as u64;
        let pending_appointments = state
            .appointments
            .values()
            .filter(|a| {
                in_site(a.site_id)
                    && a.status == AppointmentStatus::Scheduled
                    && a.scheduled_at >= query.now
            })
            .count() as u64;
        let low_stock_alerts = state
            .inventory
            .values()
            .filter(|r| in_site(r.site_id) && r.stock < query.low_stock_threshold)
            .count() as u64;

        Ok(DashboardStats {
            appointments_today,
            patients_seen_today,
            pending_appointments,
            low_stock_alerts,
        })
    }
}
