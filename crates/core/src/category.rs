//! Category list normalization.
//!
//! The categories endpoint has returned both plain strings and
//! `{ "name": ... }` records over time. [`RawCategory`] captures either shape
//! at the boundary and [`normalize_categories`] folds them into the single
//! list the storefront displays.

use serde::Deserialize;
use serde_json::Value;

/// Sentinel category meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Categories shown when the source is unreachable or returns nothing usable.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Electronics", "Sports", "Home", "Accessories"];

/// A category entry as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCategory {
    /// `"Electronics"`
    Named(String),
    /// `{ "name": "Electronics", ... }`
    Record { name: String },
}

impl RawCategory {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Record { name } => name,
        }
    }
}

impl From<&str> for RawCategory {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

/// The default category list, starting with the [`ALL_CATEGORIES`] sentinel.
#[must_use]
pub fn default_categories() -> Vec<String> {
    std::iter::once(ALL_CATEGORIES)
        .chain(DEFAULT_CATEGORIES)
        .map(str::to_owned)
        .collect()
}

/// Decode a categories response. A non-array body yields an empty list and
/// elements of any other shape are skipped.
#[must_use]
pub fn decode_categories(value: Value) -> Vec<RawCategory> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Build the display list: `"All"` first, then each distinct non-empty name
/// in first-seen order.
///
/// Names are trimmed before comparison. If the input contributes no names at
/// all, [`default_categories`] is returned instead.
#[must_use]
pub fn normalize_categories<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = RawCategory>,
{
    let mut categories = vec![ALL_CATEGORIES.to_owned()];
    for category in raw {
        let name = category.name().trim();
        if name.is_empty() || categories.iter().any(|existing| existing == name) {
            continue;
        }
        categories.push(name.to_owned());
    }

    if categories.len() == 1 {
        return default_categories();
    }
    categories
}
