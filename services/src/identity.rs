// services/src/identity.rs
use hmac::{Hmac, Mac};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    AuditAction, Employee, HospitalError, HospitalResult, Person, Role,
};
use hospital_storage::HospitalStore;

use crate::audit::AuditService;
use crate::policy::AuthContext;

type HmacSha256 = Hmac<Sha256>;

/// One-way password digest primitive. Kept behind a trait so the keyed-HMAC
/// default can be swapped for a store-side verifier without touching the
/// authentication flow.
pub trait PasswordHasher: Send + Sync + Debug {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct HmacSha256Hasher {
    secret: Vec<u8>,
}

impl HmacSha256Hasher {
    pub fn new(secret: &[u8]) -> Self {
        HmacSha256Hasher {
            secret: secret.to_vec(),
        }
    }
}

impl PasswordHasher for HmacSha256Hasher {
    fn hash(&self, password: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(password.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(password.as_bytes());
        match hex::decode(stored_hash) {
            Ok(expected) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

/// What a successful login yields: the identity the caller attaches to its
/// session for the rest of the interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeIdentity {
    pub employee_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub home_site: Uuid,
    pub site_name: String,
    pub department: Option<Uuid>,
}

impl EmployeeIdentity {
    pub fn context(&self) -> AuthContext {
        AuthContext {
            employee_id: self.employee_id,
            role: self.role,
            home_site: self.home_site,
            department: self.department,
        }
    }
}

/// Full profile view for the authenticated employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub person: Person,
    pub role: Role,
    pub site_name: String,
    pub department_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentityService {
    store: Arc<dyn HospitalStore>,
    hasher: Arc<dyn PasswordHasher>,
    audit: AuditService,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn HospitalStore>,
        hasher: Arc<dyn PasswordHasher>,
        audit: AuditService,
    ) -> Self {
        IdentityService {
            store,
            hasher,
            audit,
        }
    }

    /// Resolves an email/password pair to an active employee identity.
    /// A wrong email and a wrong password are indistinguishable to the
    /// caller; an inactive account is reported as such only after the
    /// password checks out.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        origin_ip: Option<&str>,
    ) -> HospitalResult<EmployeeIdentity> {
        let (person, employee) = self
            .store
            .find_employee_by_email(email)
            .await?
            .ok_or(HospitalError::InvalidCredentials)?;
        if !self.hasher.verify(password, &employee.password_hash) {
            debug!("failed login attempt for {email}");
            return Err(HospitalError::InvalidCredentials);
        }
        if !employee.active {
            return Err(HospitalError::AccountInactive);
        }
        let site_name = self
            .store
            .get_site(employee.home_site)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();
        // Best effort: a failed audit append never blocks the login.
        self.audit
            .record(
                Some(employee.person_id),
                AuditAction::Login,
                "employees",
                &employee.person_id.to_string(),
                origin_ip,
            )
            .await;
        info!("{} logged in as {}", person.full_name(), employee.role);
        Ok(EmployeeIdentity {
            employee_id: employee.person_id,
            name: person.full_name(),
            email: person.email,
            role: employee.role,
            home_site: employee.home_site,
            site_name,
            department: employee.department,
        })
    }

    pub async fn logout(&self, ctx: &AuthContext, origin_ip: Option<&str>) {
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Logout,
                "employees",
                &ctx.employee_id.to_string(),
                origin_ip,
            )
            .await;
    }

    pub async fn profile(&self, ctx: &AuthContext) -> HospitalResult<EmployeeProfile> {
        let (person, employee) = self
            .store
            .get_employee(ctx.employee_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("employee"))?;
        let site_name = self
            .store
            .get_site(employee.home_site)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();
        let department_name = match employee.department {
            Some(id) => self.store.get_department(id).await?.map(|d| d.name),
            None => None,
        };
        Ok(EmployeeProfile {
            person,
            role: employee.role,
            site_name,
            department_name,
        })
    }

    /// Re-verifies the current password before storing the new hash.
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        current: &str,
        new: &str,
    ) -> HospitalResult<()> {
        if new.len() < 8 {
            return Err(HospitalError::validation(
                "new password must be at least 8 characters",
            ));
        }
        let (_, employee): (Person, Employee) = self
            .store
            .get_employee(ctx.employee_id)
            .await?
            .ok_or_else(|| HospitalError::not_found("employee"))?;
        if !self.hasher.verify(current, &employee.password_hash) {
            return Err(HospitalError::validation("current password is incorrect"));
        }
        self.store
            .set_employee_password(ctx.employee_id, self.hasher.hash(new))
            .await?;
        self.audit
            .record(
                Some(ctx.employee_id),
                AuditAction::Update,
                "employees",
                &ctx.employee_id.to_string(),
                None,
            )
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HmacSha256Hasher, PasswordHasher};

    #[test]
    fn hash_round_trips() {
        let hasher = HmacSha256Hasher::new(b"test-secret");
        let stored = hasher.hash("hunter2!");
        assert!(hasher.verify("hunter2!", &stored));
        assert!(!hasher.verify("hunter3!", &stored));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        let hasher = HmacSha256Hasher::new(b"test-secret");
        assert!(!hasher.verify("anything", "not-hex"));
        assert!(!hasher.verify("anything", ""));
    }
}
