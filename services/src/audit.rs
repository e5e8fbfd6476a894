// services/src/audit.rs
use chrono::Utc;
use log::warn;
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{AuditAction, AuditEvent, HospitalError, HospitalResult};
use hospital_storage::HospitalStore;

use crate::policy::{authorize, Action, AuthContext, Resource};

/// Best-effort append-only audit trail. Recording failures are logged and
/// swallowed so they can never abort the operation they accompany.
#[derive(Debug, Clone)]
pub struct AuditService {
    store: Arc<dyn HospitalStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        AuditService { store }
    }

    pub async fn record(
        &self,
        employee_id: Option<Uuid>,
        action: AuditAction,
        table_name: &str,
        record_id: &str,
        origin_ip: Option<&str>,
    ) {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            employee_id,
            action,
            table_name: table_name.to_string(),
            record_id: record_id.to_string(),
            occurred_at: Utc::now(),
            origin_ip: origin_ip.map(str::to_string),
        };
        if let Err(e) = self.store.append_audit(event).await {
            warn!("audit append failed ({action} on {table_name}): {e}");
        }
    }

    /// Newest-first page of the log. Administrator and Auditor roles only.
    pub async fn read_log(
        &self,
        ctx: &AuthContext,
        limit: usize,
    ) -> HospitalResult<Vec<AuditEvent>> {
        if !authorize(ctx, Resource::AuditLog, Action::Read) {
            return Err(HospitalError::NotAuthorized("audit log".into()));
        }
        self.store.list_audit(limit).await
    }
}
