// services/src/equipment.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    AuditAction, Equipment, EquipmentStatus, HospitalError, HospitalResult, Role,
};
use hospital_storage::HospitalStore;

use crate::audit::AuditService;
use crate::policy::AuthContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipment {
    pub name: String,
    pub brand_model: Option<String>,
    pub department_id: Uuid,
    pub last_maintenance: Option<NaiveDate>,
    pub responsible_employee: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct EquipmentService {
    store: Arc<dyn HospitalStore>,
    audit: AuditService,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn HospitalStore>, audit: AuditService) -> Self {
        EquipmentService { store, audit }
    }

    /// Registers a device under a department; its site follows from the
    /// department and must match a non-Administrator caller's home site.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: NewEquipment,
    ) -> HospitalResult<Equipment> {
        if request.name.trim().is_empty() {
            return Err(HospitalError::validation("equipment name is required"));
        }
        let department = self
            .store
            .get_department(request.department_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("department"))?;
        if ctx.role != Role::Administrator && department.site_id != ctx.home_site {
            return Err(HospitalError::NotAuthorized("equipment at another site".into()));
        }
        if let Some(responsible) = request.responsible_employee {
            self.store
                .get_employee(responsible)
                .await?
                .ok_or_else(|| HospitalError::not_found("responsible employee"))?;
        }
        let equipment = Equipment {
            id: Uuid::new_v4(),
            name: request.name,
            brand_model: request.brand_model,
            department_id: department.id,
            site_id: department.site_id,
            status: EquipmentStatus::Operational,
            last_maintenance: request.last_maintenance,
            responsible_employee: request.responsible_employee,
        };
        self.store.insert_equipment(equipment.clone()).await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Insert,
                "equipment",
                &equipment.id.to_string(),
                None,
            )
            .await;
        Ok(equipment)
    }

    pub async fn list(&self, ctx: &AuthContext) -> HospitalResult<Vec<Equipment>> {
        self.store.list_equipment(ctx.scope().site()).await
    }

    pub async fn detail(&self, ctx: &AuthContext, id: Uuid) -> HospitalResult<Equipment> {
        let equipment = self
            .store
            .get_equipment(id)
            .await?
            .ok_or_else(|| HospitalError::not_found("equipment"))?;
        if ctx.role != Role::Administrator && equipment.site_id != ctx.home_site {
            return Err(HospitalError::NotAuthorized("equipment".into()));
        }
        Ok(equipment)
    }

    /// Transition-checked status change; decommissioned devices reject
    /// everything. A maintenance date may be stamped alongside.
    pub async fn set_status(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        status: EquipmentStatus,
        maintenance_date: Option<NaiveDate>,
    ) -> HospitalResult<Equipment> {
        // Reuse the detail read for the site check.
        self.detail(ctx, id).await?;
        let equipment = self
            .store
            .set_equipment_status(id, status, maintenance_date)
            .await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Update,
                "equipment",
                &id.to_string(),
                None,
            )
            .await;
        Ok(equipment)
    }
}
