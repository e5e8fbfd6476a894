// services/src/policy.rs
//! Row-scoping and role policy, defined once and consulted by every service.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hospital_models::{Appointment, Role};
use hospital_storage::{AppointmentFilter, HistoryFilter, PrescriptionFilter};

/// Immutable identity attached to a request after authentication. Passed
/// into every operation call; never stored as ambient global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    pub employee_id: Uuid,
    pub role: Role,
    pub home_site: Uuid,
    pub department: Option<Uuid>,
}

impl AuthContext {
    /// The row visibility this caller gets on clinical resources:
    /// Administrator sees all sites, a Doctor only rows where they are the
    /// assigned clinician, everyone else their home site.
    pub fn scope(&self) -> Scope {
        match self.role {
            Role::Administrator => Scope::All,
            Role::Doctor => Scope::Own {
                site: self.home_site,
                clinician: self.employee_id,
            },
            _ => Scope::Site(self.home_site),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Site(Uuid),
    Own { site: Uuid, clinician: Uuid },
}

impl Scope {
    /// `None` means every site.
    pub fn site(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Site(site) | Scope::Own { site, .. } => Some(*site),
        }
    }

    pub fn clinician(&self) -> Option<Uuid> {
        match self {
            Scope::Own { clinician, .. } => Some(*clinician),
            _ => None,
        }
    }

    pub fn appointment_filter(&self) -> AppointmentFilter {
        AppointmentFilter {
            site: self.site(),
            clinician: self.clinician(),
            ..AppointmentFilter::default()
        }
    }

    pub fn history_filter(&self) -> HistoryFilter {
        HistoryFilter {
            site: self.site(),
            clinician: self.clinician(),
            patient: None,
        }
    }

    pub fn prescription_filter(&self) -> PrescriptionFilter {
        PrescriptionFilter {
            site: self.site(),
            clinician: self.clinician(),
            patient: None,
        }
    }

    /// Detail-read check mirroring the listing filters, so single-row reads
    /// can never leak what a listing would hide.
    pub fn permits_appointment(&self, appointment: &Appointment) -> bool {
        match self {
            Scope::All => true,
            Scope::Site(site) => appointment.site_id == *site,
            Scope::Own { clinician, .. } => appointment.clinician_id == *clinician,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Patients,
    Appointments,
    Histories,
    Prescriptions,
    Inventory,
    Equipment,
    AuditLog,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
}

/// The single role-gate table. Scoping is handled by [`Scope`]; this only
/// answers whether the role may attempt the action at all.
pub fn authorize(ctx: &AuthContext, resource: Resource, action: Action) -> bool {
    use Action::*;
    use Resource::*;
    match (resource, action) {
        (AuditLog, Read) => ctx.role.can_read_audit_log(),
        (AuditLog, _) => false,
        // Writing a diagnosis or a prescription is clinical work.
        (Histories, Create | Update) | (Prescriptions, Create) => {
            matches!(ctx.role, Role::Doctor | Role::Administrator)
        }
        // Direct stock adjustment is pharmacy/administrative work.
        (Inventory, Update) => {
            matches!(ctx.role, Role::Administrator | Role::Nurse | Role::Clerk)
        }
        // Everything else is open to any authenticated employee, with row
        // scoping still applied.
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospital_models::Role;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            employee_id: Uuid::new_v4(),
            role,
            home_site: Uuid::new_v4(),
            department: None,
        }
    }

    #[test]
    fn admin_scope_is_unbounded() {
        let scope = ctx(Role::Administrator).scope();
        assert_eq!(scope, Scope::All);
        assert_eq!(scope.site(), None);
        assert_eq!(scope.clinician(), None);
    }

    #[test]
    fn doctor_scope_pins_the_clinician() {
        let c = ctx(Role::Doctor);
        let scope = c.scope();
        assert_eq!(scope.clinician(), Some(c.employee_id));
        assert_eq!(scope.site(), Some(c.home_site));
    }

    #[test]
    fn nurse_scope_is_site_bound() {
        let c = ctx(Role::Nurse);
        assert_eq!(c.scope(), Scope::Site(c.home_site));
    }

    #[test]
    fn audit_log_gate() {
        assert!(authorize(&ctx(Role::Auditor), Resource::AuditLog, Action::Read));
        assert!(authorize(&ctx(Role::Administrator), Resource::AuditLog, Action::Read));
        assert!(!authorize(&ctx(Role::Doctor), Resource::AuditLog, Action::Read));
    }

    #[test]
    fn prescription_writes_are_clinical() {
        assert!(authorize(&ctx(Role::Doctor), Resource::Prescriptions, Action::Create));
        assert!(!authorize(&ctx(Role::Nurse), Resource::Prescriptions, Action::Create));
        assert!(!authorize(&ctx(Role::Clerk), Resource::Prescriptions, Action::Create));
    }

    #[test]
    fn stock_updates_exclude_doctors() {
        assert!(authorize(&ctx(Role::Nurse), Resource::Inventory, Action::Update));
        assert!(!authorize(&ctx(Role::Doctor), Resource::Inventory, Action::Update));
    }
}
