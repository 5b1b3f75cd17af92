use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum::response::Json;

use crate::policy::PolicyError;
use crate::schemas::{ErrorResponse, ValidationErrorResponse};

pub mod auth;
pub mod categories;
pub mod courses;
pub mod health;
pub mod lessons;
pub mod users;

/// Build a plain error response.
pub(crate) fn error_response(status: StatusCode, error: &str, code: &str) -> Response {
    (status, Json(ErrorResponse::new(error, code))).into_response()
}

/// Build a 400 carrying field-scoped validation messages.
pub(crate) fn validation_response(errors: ValidationErrorResponse) -> Response {
    (StatusCode::BAD_REQUEST, Json(errors)).into_response()
}

/// Map a policy decision to its HTTP shape: missing identity is 401,
/// insufficient rights is a deliberately generic 403.
pub(crate) fn policy_response(err: PolicyError) -> Response {
    match err {
        PolicyError::Unauthenticated => error_response(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
            "AUTHENTICATION_REQUIRED",
        ),
        PolicyError::Forbidden => error_response(
            StatusCode::FORBIDDEN,
            "You do not have permission to perform this action",
            "PERMISSION_DENIED",
        ),
    }
}
