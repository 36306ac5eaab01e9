//! Unified error handling with Sentry integration.
//!
//! Provides the `StorefrontError` type returned by the view-model and the
//! CLI, plus the helpers that attach the signed-in user and a trail of cart
//! actions to Sentry reports.

use thiserror::Error;

use megacart_core::ProductId;

use crate::config::ConfigError;
use crate::session::AuthFailure;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Login or registration was refused.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthFailure),

    /// The product is not in the loaded catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Terminal input could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorefrontError {
    /// Message suitable for showing to a shopper.
    ///
    /// Internal details are kept out; auth failures already carry a
    /// user-facing reason.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The storefront is misconfigured".to_string(),
            Self::Auth(failure) => failure.reason.clone(),
            Self::UnknownProduct(_) => "That product is not available".to_string(),
            Self::Io(_) => "Could not read input".to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
