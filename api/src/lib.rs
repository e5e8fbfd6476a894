// api/src/lib.rs
//! JSON surface over the hospital services: payload structs, the
//! `{resource: ...}` / `{error: ...}` envelope and the error to HTTP status
//! mapping. Routing and transport stay outside this crate; a web layer
//! resolves the session to an `AuthContext` and calls into [`Api`].

pub mod handlers;
pub mod payloads;
pub mod response;

pub use handlers::Api;
pub use payloads::{
    AppointmentListQuery, AuditLogQuery, ChangePasswordRequest, DiagnosisRequest,
    EquipmentStatusRequest, LoginRequest, PatientListQuery, ReportQuery, StockUpdateRequest,
};
pub use response::{respond, status_for, ApiResponse};
