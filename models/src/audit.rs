// models/src/audit.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Login,
    Logout,
    Insert,
    Update,
    Select,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Insert => "INSERT",
            AuditAction::Update => "UPDATE",
            AuditAction::Select => "SELECT",
        };
        f.write_str(s)
    }
}

/// Append-only log entry for a security-relevant action. `employee_id` is
/// None for system-generated events. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: String,
    pub occurred_at: DateTime<Utc>,
    pub origin_ip: Option<String>,
}
