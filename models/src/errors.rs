// models/src/errors.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy shared by every component. Business-rule failures carry a
/// stable kind so callers can branch on them; store failures are collapsed
/// into `Internal` before they reach any caller-facing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum HospitalError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    AccountInactive,
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("{0} not found")]
    NotFound(String),
    #[error("internal error")]
    Internal,
}

pub type HospitalResult<T> = Result<T, HospitalError>;

impl HospitalError {
    pub fn not_found(entity: &str) -> Self {
        HospitalError::NotFound(entity.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        HospitalError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        HospitalError::Conflict(msg.into())
    }

    /// True for errors a caller can correct; false for `Internal`.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, HospitalError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::HospitalError;

    #[test]
    fn internal_is_not_a_client_error() {
        assert!(!HospitalError::Internal.is_client_error());
        assert!(HospitalError::validation("bad date").is_client_error());
    }

    #[test]
    fn insufficient_stock_message_names_quantities() {
        let err = HospitalError::InsufficientStock { requested: 8, available: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient stock: requested 8, available 5"
        );
    }
}
