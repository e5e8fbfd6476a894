// models/src/equipment.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Equipment lifecycle. Decommissioned is terminal; operational and
/// maintenance alternate freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentStatus {
    Operational,
    Maintenance,
    Decommissioned,
}

impl EquipmentStatus {
    pub fn valid_transitions(&self) -> &'static [EquipmentStatus] {
        match self {
            EquipmentStatus::Operational => {
                &[EquipmentStatus::Maintenance, EquipmentStatus::Decommissioned]
            }
            EquipmentStatus::Maintenance => {
                &[EquipmentStatus::Operational, EquipmentStatus::Decommissioned]
            }
            EquipmentStatus::Decommissioned => &[],
        }
    }

    pub fn can_transition_to(&self, next: EquipmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EquipmentStatus::Operational => "OPERATIONAL",
            EquipmentStatus::Maintenance => "MAINTENANCE",
            EquipmentStatus::Decommissioned => "DECOMMISSIONED",
        };
        f.write_str(s)
    }
}

/// A device owned by a department (and transitively by its site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub brand_model: Option<String>,
    pub department_id: Uuid,
    pub site_id: Uuid,
    pub status: EquipmentStatus,
    pub last_maintenance: Option<NaiveDate>,
    pub responsible_employee: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::EquipmentStatus;

    #[test]
    fn decommissioned_is_terminal() {
        assert!(EquipmentStatus::Decommissioned.valid_transitions().is_empty());
        assert!(EquipmentStatus::Operational
            .can_transition_to(EquipmentStatus::Decommissioned));
        assert!(EquipmentStatus::Maintenance
            .can_transition_to(EquipmentStatus::Operational));
    }
}
