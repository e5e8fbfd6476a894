// services/src/pharmacy.rs
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    AuditAction, CoreConfig, HospitalError, HospitalResult, InventoryRecord, Prescription, Role,
    StockLevel,
};
use hospital_storage::HospitalStore;

use crate::audit::AuditService;
use crate::policy::{authorize, Action, AuthContext, Resource, Scope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub history_id: Uuid,
    pub medication_id: Uuid,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u32,
    pub quantity: u32,
}

/// Inventory row joined with its catalog and site names, plus the band the
/// dashboards alert on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub record: InventoryRecord,
    pub medication_name: String,
    pub active_ingredient: Option<String>,
    pub site_name: String,
    pub level: StockLevel,
}

#[derive(Debug, Clone)]
pub struct PharmacyService {
    store: Arc<dyn HospitalStore>,
    audit: AuditService,
    config: CoreConfig,
}

impl PharmacyService {
    pub fn new(store: Arc<dyn HospitalStore>, audit: AuditService, config: CoreConfig) -> Self {
        PharmacyService {
            store,
            audit,
            config,
        }
    }

    /// Issues a prescription against a clinical visit. The dispensing site
    /// is the appointment's site; stock check, decrement and prescription
    /// insert are one atomic store call, so concurrent issuance cannot
    /// oversell.
    pub async fn prescribe(
        &self,
        ctx: &AuthContext,
        request: NewPrescription,
    ) -> HospitalResult<Prescription> {
        if !authorize(ctx, Resource::Prescriptions, Action::Create) {
            return Err(HospitalError::NotAuthorized("prescribe".into()));
        }
        if request.quantity == 0 {
            return Err(HospitalError::validation("quantity must be positive"));
        }
        if request.duration_days == 0 || request.duration_days > self.config.max_prescription_days
        {
            return Err(HospitalError::validation(format!(
                "duration must be between 1 and {} days",
                self.config.max_prescription_days
            )));
        }
        let history = self
            .store
            .get_history(request.history_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("clinical history"))?;
        let appointment = self
            .store
            .get_appointment(history.appointment_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("appointment"))?;
        if ctx.role != Role::Administrator && appointment.clinician_id != ctx.employee_id {
            return Err(HospitalError::NotAuthorized(
                "only the assigned clinician may prescribe for this visit".into(),
            ));
        }
        self.store
            .get_medication(request.medication_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("medication"))?;

        let prescription = Prescription {
            id: Uuid::new_v4(),
            history_id: history.id,
            appointment_id: appointment.id,
            medication_id: request.medication_id,
            dosage: request.dosage,
            frequency: request.frequency,
            duration_days: request.duration_days,
            quantity: request.quantity,
            issued_on: Utc::now().date_naive(),
        };
        let prescription = self
            .store
            .issue_prescription(prescription, appointment.site_id)
            .await?;
        info!(
            "prescription {} issued against history {}",
            prescription.id, history.id
        );
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Insert,
                "prescriptions",
                &prescription.id.to_string(),
                None,
            )
            .await;
        Ok(prescription)
    }

    pub async fn list(&self, ctx: &AuthContext) -> HospitalResult<Vec<Prescription>> {
        self.store
            .list_prescriptions(&ctx.scope().prescription_filter())
            .await
    }

    /// Stock at the caller's site (every site for an Administrator), with
    /// catalog names resolved and level banding applied.
    pub async fn inventory(&self, ctx: &AuthContext) -> HospitalResult<Vec<InventoryLine>> {
        let records = self.store.list_inventory(ctx.scope().site()).await?;
        self.to_lines(records).await
    }

    /// Rows below the configured alert threshold.
    pub async fn low_stock(&self, ctx: &AuthContext) -> HospitalResult<Vec<InventoryLine>> {
        let records = self
            .store
            .list_inventory(ctx.scope().site())
            .await?
            .into_iter()
            .filter(|r| r.stock < self.config.low_stock_threshold)
            .collect();
        self.to_lines(records).await
    }

    /// Direct stock set (restock or correction); pharmacy/administrative
    /// roles only, and never across sites for a non-Administrator.
    pub async fn set_stock(
        &self,
        ctx: &AuthContext,
        inventory_id: Uuid,
        stock: u32,
    ) -> HospitalResult<InventoryRecord> {
        if !authorize(ctx, Resource::Inventory, Action::Update) {
            return Err(HospitalError::NotAuthorized("inventory update".into()));
        }
        if let Scope::Site(site) | Scope::Own { site, .. } = ctx.scope() {
            let owned = self
                .store
                .list_inventory(Some(site))
                .await?
                .iter()
                .any(|r| r.id == inventory_id);
            if !owned {
                return Err(HospitalError::NotAuthorized("inventory update".into()));
            }
        }
        let record = self.store.set_stock(inventory_id, stock).await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Update,
                "inventory",
                &inventory_id.to_string(),
                None,
            )
            .await;
        Ok(record)
    }

    async fn to_lines(
        &self,
        records: Vec<InventoryRecord>,
    ) -> HospitalResult<Vec<InventoryLine>> {
        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            let medication = self.store.get_medication(record.medication_id).await?;
            let site_name = self
                .store
                .get_site(record.site_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_default();
            let (medication_name, active_ingredient) = match medication {
                Some(m) => (m.name, m.active_ingredient),
                None => (String::new(), None),
            };
            lines.push(InventoryLine {
                level: record.level(),
                record,
                medication_name,
                active_ingredient,
                site_name,
            });
        }
        Ok(lines)
    }
}
