// api/src/response.rs
use serde::Serialize;
use serde_json::{json, Value};

use hospital_models::HospitalError;

/// Transport-agnostic response: a status code plus the JSON body. A routing
/// layer only has to serialize `body` and set `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Success envelope: `{ "<key>": <value> }`.
    pub fn ok<T: Serialize>(key: &str, value: &T) -> ApiResponse {
        ApiResponse {
            status: 200,
            body: json!({ key: value }),
        }
    }

    pub fn created<T: Serialize>(key: &str, value: &T) -> ApiResponse {
        ApiResponse {
            status: 201,
            body: json!({ key: value }),
        }
    }

    /// Failure envelope: `{ "error": "<message>" }`. Internal failures hide
    /// their detail behind a generic message.
    pub fn from_error(err: &HospitalError) -> ApiResponse {
        ApiResponse {
            status: status_for(err),
            body: json!({ "error": err.to_string() }),
        }
    }
}

/// Business-rule violations surface as 400 alongside plain validation, the
/// way the original forms reported them.
pub fn status_for(err: &HospitalError) -> u16 {
    match err {
        HospitalError::Validation(_)
        | HospitalError::Conflict(_)
        | HospitalError::InsufficientStock { .. } => 400,
        HospitalError::InvalidCredentials | HospitalError::AccountInactive => 401,
        HospitalError::NotAuthorized(_) => 403,
        HospitalError::NotFound(_) => 404,
        HospitalError::Internal => 500,
    }
}

/// Collapses a service result into a response with the given envelope key.
pub fn respond<T: Serialize>(key: &str, result: Result<T, HospitalError>) -> ApiResponse {
    match result {
        Ok(value) => ApiResponse::ok(key, &value),
        Err(err) => ApiResponse::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, ApiResponse};
    use hospital_models::HospitalError;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(status_for(&HospitalError::validation("x")), 400);
        assert_eq!(status_for(&HospitalError::conflict("x")), 400);
        assert_eq!(
            status_for(&HospitalError::InsufficientStock { requested: 8, available: 5 }),
            400
        );
        assert_eq!(status_for(&HospitalError::InvalidCredentials), 401);
        assert_eq!(status_for(&HospitalError::AccountInactive), 401);
        assert_eq!(status_for(&HospitalError::NotAuthorized("x".into())), 403);
        assert_eq!(status_for(&HospitalError::not_found("patient")), 404);
        assert_eq!(status_for(&HospitalError::Internal), 500);
    }

    #[test]
    fn error_envelope_carries_the_message() {
        let resp = ApiResponse::from_error(&HospitalError::not_found("patient"));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["error"], "patient not found");
    }

    #[test]
    fn success_envelope_is_keyed_by_resource() {
        let resp = ApiResponse::ok("sites", &vec!["a", "b"]);
        assert_eq!(resp.status, 200);
        assert!(resp.body["sites"].is_array());
    }
}
