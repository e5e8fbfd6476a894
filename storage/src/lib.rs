// storage/src/lib.rs

pub mod memory;
pub mod store;
pub mod types;

pub use memory::InMemoryStore;
pub use store::HospitalStore;
pub use types::{
    AppointmentFilter, AppointmentUpdate, ClinicianConsultationsRow, DashboardQuery,
    DashboardStats, DiseaseStatsRow, HistoryFilter, MedicationUsageRow, PrescriptionFilter,
};
