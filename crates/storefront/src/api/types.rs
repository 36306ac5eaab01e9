//! Wire types for the MegaCart backend REST API.

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use megacart_core::{Email, UserId};

// =============================================================================
// Users
// =============================================================================

/// A user record as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: Email,
    /// Account creation time. The backend emits naive UTC timestamps, so
    /// both RFC 3339 and offset-less ISO 8601 are accepted.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

// =============================================================================
// Auth requests / responses
// =============================================================================

/// Details submitted by the registration form.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    /// Bearer token. Absent when the backend registers a user without
    /// signing them in.
    pub token: Option<SecretString>,
    pub user: User,
}

/// `{access_token, token_type, user}`, `{message, user}` or a bare user
/// record. Variant order matters: a token body also carries `user`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum AuthBody {
    Token {
        access_token: String,
        user: User,
    },
    Wrapped {
        user: User,
    },
    UserOnly(User),
}

impl From<AuthBody> for AuthGrant {
    fn from(body: AuthBody) -> Self {
        match body {
            AuthBody::Token { access_token, user } => Self {
                token: Some(SecretString::from(access_token)),
                user,
            },
            AuthBody::Wrapped { user } | AuthBody::UserOnly(user) => Self { token: None, user },
        }
    }
}

// =============================================================================
// Error bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

/// The `detail` field of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// `"detail": "Invalid credentials"`
    Message(String),
    /// `"detail": [{"loc": ["body", "email"], "msg": "..."}]`
    Validation(Vec<FieldError>),
}

/// One request-validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl FieldError {
    /// Name of the offending field: the last element of `loc`.
    #[must_use]
    pub fn field(&self) -> String {
        match self.loc.last() {
            Some(serde_json::Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => "request".to_string(),
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field(), e.msg))
                    .collect::<Vec<_>>()
                    .join(", ");
                f.write_str(&joined)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_accepts_backend_shapes() {
        let user: User = serde_json::from_value(json!({
            "id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "name": "Test User",
            "email": "test@example.com",
            "created_at": "2024-01-15T10:30:00.123456"
        }))
        .unwrap();
        assert_eq!(user.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(
            user.created_at.unwrap().to_rfc3339(),
            "2024-01-15T10:30:00.123456+00:00"
        );

        let user: User =
            serde_json::from_value(json!({"id": 1, "email": "a@b.c", "created_at": "soon"}))
                .unwrap();
        assert_eq!(user.id.as_str(), "1");
        assert!(user.name.is_empty());
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_auth_body_with_token() {
        let body: AuthBody = serde_json::from_value(json!({
            "access_token": "abc.def.ghi",
            "token_type": "bearer",
            "user": {"id": 1, "name": "Test User", "email": "test@example.com"}
        }))
        .unwrap();
        let grant = AuthGrant::from(body);
        assert_eq!(grant.token.unwrap().expose_secret(), "abc.def.ghi");
        assert_eq!(grant.user.name, "Test User");
    }

    #[test]
    fn test_auth_body_bare_user() {
        let body: AuthBody = serde_json::from_value(json!({
            "id": "42",
            "name": "New User",
            "email": "new@example.com",
            "created_at": "2024-01-15T10:30:00Z"
        }))
        .unwrap();
        let grant = AuthGrant::from(body);
        assert!(grant.token.is_none());
        assert_eq!(grant.user.id.as_str(), "42");
    }

    #[test]
    fn test_auth_body_message_and_user() {
        let body: AuthBody = serde_json::from_value(json!({
            "message": "User registered successfully",
            "user": {"id": 2, "name": "Asha", "email": "asha@example.com"}
        }))
        .unwrap();
        let grant = AuthGrant::from(body);
        assert!(grant.token.is_none());
        assert_eq!(grant.user.id.as_str(), "2");
        assert_eq!(grant.user.name, "Asha");
    }

    #[test]
    fn test_error_detail_shapes() {
        let body: ErrorBody =
            serde_json::from_value(json!({"detail": "Email already registered"})).unwrap();
        assert_eq!(
            body.detail,
            Some(ErrorDetail::Message("Email already registered".to_string()))
        );

        let body: ErrorBody = serde_json::from_value(json!({"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
            {"loc": ["body", "password"], "msg": "field required"}
        ]}))
        .unwrap();
        assert_eq!(
            body.detail.unwrap().to_string(),
            "email: value is not a valid email address, password: field required"
        );

        let body: ErrorBody = serde_json::from_value(json!({"message": "nope"})).unwrap();
        assert!(body.detail.is_none());
    }

    #[test]
    fn test_field_error_numeric_or_missing_loc() {
        let error = FieldError {
            loc: vec![json!("body"), json!(0)],
            msg: "bad".to_string(),
        };
        assert_eq!(error.field(), "0");

        let error = FieldError {
            loc: vec![],
            msg: "bad".to_string(),
        };
        assert_eq!(error.field(), "request");
    }

    #[test]
    fn test_registration_debug_redacts_password() {
        let registration = Registration {
            name: "Asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            password: SecretString::from("hunter22"),
        };
        let debug_output = format!("{registration:?}");
        assert!(debug_output.contains("asha@example.com"));
        assert!(!debug_output.contains("hunter22"));
    }
}
