//! MegaCart Core - catalog, cart and shared types.
//!
//! This crate holds the storefront's client-side state and the types it is
//! built from:
//! - [`catalog`] - derive the visible product list from search and category input
//! - [`cart`] - the cart ledger and its totals
//! - [`category`] - normalize the category list served by the backend
//! - [`product`] - product records and their tolerant JSON decoding
//! - [`fallback`] - sample catalog used when the backend is unreachable
//! - [`types`] - newtype wrappers for ids, prices and emails
//!
//! # Architecture
//!
//! The core crate performs no I/O: no HTTP clients, no files, no clocks.
//! Everything here is a plain function or a synchronous method, so the
//! `megacart-storefront` crate decides when to fetch and when to re-render.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod category;
pub mod fallback;
pub mod product;
pub mod types;

pub use cart::{Cart, CartLineItem};
pub use catalog::{CatalogView, FilterState, filter};
pub use category::{ALL_CATEGORIES, RawCategory, default_categories, normalize_categories};
pub use product::{Product, decode_products};
pub use types::*;
