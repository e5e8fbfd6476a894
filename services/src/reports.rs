// services/src/reports.rs
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{CoreConfig, HospitalResult};
use hospital_storage::{
    ClinicianConsultationsRow, DashboardQuery, DashboardStats, DiseaseStatsRow, HospitalStore,
    MedicationUsageRow,
};

use crate::policy::AuthContext;

/// Cross-site aggregates. Non-administrators get the rows of their own
/// site; administrators see every site, optionally narrowed to one.
#[derive(Debug, Clone)]
pub struct ReportService {
    store: Arc<dyn HospitalStore>,
    config: CoreConfig,
}

impl ReportService {
    pub fn new(store: Arc<dyn HospitalStore>, config: CoreConfig) -> Self {
        ReportService { store, config }
    }

    fn effective_site(ctx: &AuthContext, requested: Option<Uuid>) -> Option<Uuid> {
        match ctx.scope().site() {
            Some(own) => Some(own),
            None => requested,
        }
    }

    pub async fn top_medications(
        &self,
        ctx: &AuthContext,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<MedicationUsageRow>> {
        self.store
            .top_medications(Self::effective_site(ctx, site))
            .await
    }

    pub async fn clinician_consultations(
        &self,
        ctx: &AuthContext,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<ClinicianConsultationsRow>> {
        self.store
            .clinician_consultations(Self::effective_site(ctx, site))
            .await
    }

    pub async fn disease_stats(
        &self,
        ctx: &AuthContext,
        site: Option<Uuid>,
    ) -> HospitalResult<Vec<DiseaseStatsRow>> {
        self.store
            .disease_stats(Self::effective_site(ctx, site))
            .await
    }

    /// Same-day counters for the landing view.
    pub async fn dashboard(&self, ctx: &AuthContext) -> HospitalResult<DashboardStats> {
        self.store
            .dashboard_stats(
                ctx.scope().site(),
                DashboardQuery {
                    now: Utc::now(),
                    low_stock_threshold: self.config.low_stock_threshold,
                },
            )
            .await
    }
}
