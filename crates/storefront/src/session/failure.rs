//! Mapping backend auth errors to shopper-facing failures.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::{ApiError, ErrorDetail};

const LOGIN_VALIDATION: &str = "Please enter a valid email and password";
const LOGIN_INVALID: &str = "Invalid email or password";
const LOGIN_GENERIC: &str = "Login failed. Please try again.";
const REGISTER_GENERIC: &str = "Registration failed. Please try again.";
const SERVER_ERROR: &str = "Server error. Please try again later.";
const UNREACHABLE: &str = "Unable to reach the server. Please check your connection.";

/// Broad class of an auth failure, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// 422 or another request the backend refused as malformed
    Validation,
    /// 401
    InvalidCredentials,
    /// 400/409 such as an already registered email
    Rejected,
    /// 5xx
    Server,
    /// The request never got an answer
    Network,
    /// Any other status or an unusable success body
    Unexpected,
}

/// A failed login or registration. `reason` is ready to show to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct AuthFailure {
    pub kind: AuthFailureKind,
    pub reason: String,
}

impl AuthFailure {
    #[must_use]
    pub fn new(kind: AuthFailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected_login() -> Self {
        Self::new(AuthFailureKind::Unexpected, LOGIN_GENERIC)
    }
}

/// Failure for a rejected `POST /auth/login`.
#[must_use]
pub fn login_failure(error: &ApiError) -> AuthFailure {
    match error.status() {
        Some(StatusCode::UNPROCESSABLE_ENTITY) => {
            AuthFailure::new(AuthFailureKind::Validation, LOGIN_VALIDATION)
        }
        Some(StatusCode::UNAUTHORIZED) => {
            AuthFailure::new(AuthFailureKind::InvalidCredentials, LOGIN_INVALID)
        }
        Some(StatusCode::INTERNAL_SERVER_ERROR) => {
            AuthFailure::new(AuthFailureKind::Server, SERVER_ERROR)
        }
        Some(_) => AuthFailure::new(AuthFailureKind::Unexpected, LOGIN_GENERIC),
        None => transport_failure(error, LOGIN_GENERIC),
    }
}

/// Failure for a rejected `POST /auth/register`.
///
/// A 401 reads the same as a refused login. Validation lists are flattened to `"field: msg"` pairs joined by `", "`.
#[must_use]
pub fn register_failure(error: &ApiError) -> AuthFailure {
    let detail_message = || error.detail().map(ErrorDetail::to_string);

    match error.status() {
        Some(StatusCode::UNPROCESSABLE_ENTITY) => AuthFailure::new(
            AuthFailureKind::Validation,
            detail_message().unwrap_or_else(|| REGISTER_GENERIC.to_string()),
        ),
        Some(StatusCode::UNAUTHORIZED) => {
            AuthFailure::new(AuthFailureKind::InvalidCredentials, LOGIN_INVALID)
        }
        Some(StatusCode::BAD_REQUEST | StatusCode::CONFLICT) => match error.detail() {
            Some(ErrorDetail::Message(message)) => {
                AuthFailure::new(AuthFailureKind::Rejected, message.clone())
            }
            _ => AuthFailure::new(AuthFailureKind::Rejected, REGISTER_GENERIC),
        },
        Some(StatusCode::INTERNAL_SERVER_ERROR) => {
            AuthFailure::new(AuthFailureKind::Server, SERVER_ERROR)
        }
        Some(_) => AuthFailure::new(AuthFailureKind::Unexpected, REGISTER_GENERIC),
        None => transport_failure(error, REGISTER_GENERIC),
    }
}

/// No status: either the request never completed or the body was unusable.
fn transport_failure(error: &ApiError, generic: &str) -> AuthFailure {
    match error {
        ApiError::Http(_) => AuthFailure::new(AuthFailureKind::Network, UNREACHABLE),
        _ => AuthFailure::new(AuthFailureKind::Unexpected, generic),
    }
}
