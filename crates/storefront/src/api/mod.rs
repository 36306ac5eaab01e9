//! MegaCart backend REST API client.
//!
//! # Endpoints
//!
//! - `GET  {base}/products` - product list
//! - `GET  {base}/products/{id}` - single product
//! - `GET  {base}/categories` - category names or `{name}` records
//! - `POST {base}/auth/login` - `{email, password}` -> `{access_token, user}`
//! - `POST {base}/auth/register` - `{name, email, password}` -> `{access_token, user}`,
//!   `{message, user}` or a bare user
//! - `GET  {base}/auth/me` - bearer token -> user
//! - `GET  {health_url}` - liveness probe
//!
//! Non-2xx responses carry `{"detail": ...}`, surfaced as [`ApiError::Status`].

pub mod types;

pub use types::{AuthGrant, ErrorDetail, FieldError, Registration, User};

use std::future::Future;
use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use megacart_core::{Email, Product, ProductId, decode_products, product::decode_product};

use crate::config::ApiConfig;
use types::{AuthBody, ErrorBody, LoginRequest, RegisterRequest};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}{}", format_detail(.detail.as_ref()))]
    Status {
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `detail` payload of the error response, if any.
    #[must_use]
    pub const fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Status { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

fn format_detail(detail: Option<&ErrorDetail>) -> String {
    detail.map_or_else(String::new, |detail| format!(": {detail}"))
}

/// Authentication endpoints, as seen by the session.
pub trait AuthApi {
    /// `POST /auth/login`.
    fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthGrant, ApiError>> + Send;

    /// `POST /auth/register`.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<AuthGrant, ApiError>> + Send;

    /// `GET /auth/me` with a bearer token.
    fn current_user(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the MegaCart backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    health_url: String,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                health_url: config.health_url.to_string(),
            }),
        }
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the JSON body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read as text first so error bodies can be inspected
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.detail);
            tracing::debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status { status, detail });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product list.
    ///
    /// A body that is not an array yields an empty list and malformed
    /// records are dropped; see [`decode_products`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not JSON at all.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let body = self
            .send(self.inner.client.get(self.url("/products")))
            .await?;
        Ok(decode_products(body))
    }

    /// Fetch a single product. `Ok(None)` on 404 or a malformed record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is another non-2xx.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        let request = self.inner.client.get(self.url(&format!("/products/{id}")));
        match self.send(request).await {
            Ok(body) => Ok(decode_product(body)),
            Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch the raw category list (strings or `{name}` records).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not JSON.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Value, ApiError> {
        self.send(self.inner.client.get(self.url("/categories")))
            .await
    }

    /// Probe the backend liveness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), ApiError> {
        let response = self.inner.client.get(&self.inner.health_url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status,
                detail: None,
            })
        }
    }
}

impl AuthApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthGrant, ApiError> {
        let request = self.inner.client.post(self.url("/auth/login")).json(&LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        });
        let body = self.send(request).await?;
        Ok(serde_json::from_value::<AuthBody>(body)?.into())
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterRequest {
                name: &registration.name,
                email: registration.email.as_str(),
                password: registration.password.expose_secret(),
            });
        let body = self.send(request).await?;
        Ok(serde_json::from_value::<AuthBody>(body)?.into())
    }

    #[instrument(skip(self, token))]
    async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token.expose_secret());
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: Some(ErrorDetail::Message("Invalid credentials".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 401 Unauthorized: Invalid credentials"
        );
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        assert_eq!(err.to_string(), "Backend returned 502 Bad Gateway");
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_urls_join_without_double_slash() {
        let config = ApiConfig::new("http://localhost:8000/api/").unwrap();
        let client = ApiClient::new(&config);
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/products"), "http://localhost:8000/api/products");
    }
}
