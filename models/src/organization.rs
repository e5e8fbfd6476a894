// models/src/organization.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical hospital branch. Root of the site-scoping hierarchy:
/// departments, inventory, appointments and equipment all hang off a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub central_node: bool,
}

/// Belongs to exactly one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
}
