//! MegaCart storefront client.
//!
//! Talks to the MegaCart backend and owns the shopper-side state built on
//! `megacart-core`:
//! - [`api`] - REST client for products, categories and auth
//! - [`catalog`] - cached catalog loading with offline fallback
//! - [`session`] - bearer token and signed-in user
//! - [`storefront`] - view-model tying catalog, filter and cart together
//! - [`config`] - environment configuration
//! - [`error`] - error type and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod storefront;

pub use api::ApiClient;
pub use catalog::{CatalogLoad, CatalogService, Connectivity, DataSource};
pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use session::{AuthFailure, AuthState, FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use storefront::Storefront;
