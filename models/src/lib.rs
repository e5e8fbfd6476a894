// models/src/lib.rs

pub mod appointment;
pub mod audit;
pub mod clinical;
pub mod config;
pub mod equipment;
pub mod errors;
pub mod identity;
pub mod organization;
pub mod pharmacy;

pub use appointment::{Appointment, AppointmentStatus, ServiceType};
pub use audit::{AuditAction, AuditEvent};
pub use clinical::{ClinicalHistory, Diagnosis, Disease};
pub use config::CoreConfig;
pub use equipment::{Equipment, EquipmentStatus};
pub use errors::{HospitalError, HospitalResult};
pub use identity::{DocumentType, Employee, Gender, Patient, Person, Role, Specialty};
pub use organization::{Department, Site};
pub use pharmacy::{InventoryRecord, Medication, Prescription, StockLevel};
