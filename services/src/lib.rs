// services/src/lib.rs

pub mod appointments;
pub mod audit;
pub mod clinical;
pub mod equipment;
pub mod identity;
pub mod lookup;
pub mod patients;
pub mod pharmacy;
pub mod policy;
pub mod reports;
pub mod seed;

pub use appointments::{AppointmentService, NewAppointment, UpdateAppointmentRequest};
pub use audit::AuditService;
pub use clinical::{ClinicalRecordService, HistoryDetail, VisitDetail};
pub use equipment::{EquipmentService, NewEquipment};
pub use identity::{
    EmployeeIdentity, EmployeeProfile, HmacSha256Hasher, IdentityService, PasswordHasher,
};
pub use lookup::{ClinicianRow, LookupService};
pub use patients::{NewPatient, PatientDetail, PatientService};
pub use pharmacy::{InventoryLine, NewPrescription, PharmacyService};
pub use policy::{authorize, Action, AuthContext, Resource, Scope};
pub use reports::ReportService;
pub use seed::{load_demo_data, SeedData};
