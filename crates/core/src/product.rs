//! Catalog product records.
//!
//! Products arrive from the backend as loosely-typed JSON. Decoding happens
//! once, at the boundary, through [`decode_products`]: anything that is not a
//! well-formed record is dropped there so the rest of the core only ever
//! handles fully-typed [`Product`] values.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::ProductId;

/// Highest rating a product can carry.
pub const MAX_RATING: f64 = 5.0;

/// A product as published by the catalog source.
///
/// Read-only from the storefront's point of view. A record is well-formed
/// when it has an integer `id` and a non-negative `price`; every other field
/// falls back to an empty or neutral value when missing or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Image URL or a single emoji glyph used as a placeholder.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default = "in_stock_default", deserialize_with = "null_as_in_stock")]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: u32,
}

impl Product {
    /// Create an in-stock product with empty descriptive fields.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            image: String::new(),
            in_stock: true,
            rating: 0.0,
            reviews: 0,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the average rating (clamped to `0..=5`) and review count.
    #[must_use]
    pub fn with_rating(mut self, rating: f64, reviews: u32) -> Self {
        self.rating = rating.clamp(0.0, MAX_RATING);
        self.reviews = reviews;
        self
    }

    #[must_use]
    pub const fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Whether the image field holds a URL rather than a glyph.
    #[must_use]
    pub fn has_image_url(&self) -> bool {
        self.image.starts_with("http://") || self.image.starts_with("https://")
    }
}

/// Decode a products response into well-formed records.
///
/// A body that is not a JSON array yields an empty list. Malformed elements
/// are skipped. Never fails.
#[must_use]
pub fn decode_products(value: Value) -> Vec<Product> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items.into_iter().filter_map(decode_product).collect()
}

/// Decode a single product record, returning `None` if it is malformed.
#[must_use]
pub fn decode_product(value: Value) -> Option<Product> {
    if !value.is_object() {
        return None;
    }
    let mut product: Product = serde_json::from_value(value).ok()?;
    if product.price < Decimal::ZERO {
        return None;
    }
    product.rating = product.rating.clamp(0.0, MAX_RATING);
    Some(product)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const fn in_stock_default() -> bool {
    true
}

fn null_as_in_stock<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}
