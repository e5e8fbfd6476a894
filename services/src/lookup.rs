// services/src/lookup.rs
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    Department, Disease, HospitalResult, Medication, Role, Site, Specialty,
};
use hospital_storage::HospitalStore;

/// Clinician directory row with the joined display names already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicianRow {
    pub employee_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub site_id: Uuid,
    pub department_id: Option<Uuid>,
    pub specialty: Option<String>,
}

/// Read-only catalogs backing the scheduling and pharmacy forms.
#[derive(Debug, Clone)]
pub struct LookupService {
    store: Arc<dyn HospitalStore>,
}

impl LookupService {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        LookupService { store }
    }

    pub async fn sites(&self) -> HospitalResult<Vec<Site>> {
        self.store.list_sites().await
    }

    pub async fn departments(&self, site: Option<Uuid>) -> HospitalResult<Vec<Department>> {
        self.store.list_departments(site).await
    }

    pub async fn specialties(&self) -> HospitalResult<Vec<Specialty>> {
        self.store.list_specialties().await
    }

    pub async fn medications(&self) -> HospitalResult<Vec<Medication>> {
        self.store.list_medications().await
    }

    pub async fn diseases(&self) -> HospitalResult<Vec<Disease>> {
        self.store.list_diseases().await
    }

    pub fn roles(&self) -> Vec<&'static str> {
        Role::all().iter().map(Role::name).collect()
    }

    /// Active doctors, optionally narrowed to a site and department.
    pub async fn clinicians(
        &self,
        site: Option<Uuid>,
        department: Option<Uuid>,
    ) -> HospitalResult<Vec<ClinicianRow>> {
        let specialties = self.store.list_specialties().await?;
        let rows = self.store.list_clinicians(site, department).await?;
        Ok(rows
            .into_iter()
            .map(|(person, employee)| ClinicianRow {
                employee_id: employee.person_id,
                full_name: person.full_name(),
                email: person.email,
                site_id: employee.home_site,
                department_id: employee.department,
                specialty: employee.specialty.and_then(|id| {
                    specialties.iter().find(|s| s.id == id).map(|s| s.name.clone())
                }),
            })
            .collect())
    }
}
