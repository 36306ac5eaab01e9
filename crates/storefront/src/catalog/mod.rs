//! Catalog loading with caching and offline fallback.
//!
//! Successful backend responses are cached with `moka` for the configured
//! TTL. Fallback data is never cached, so the next load retries the backend.

mod cache;

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use megacart_core::category::decode_categories;
use megacart_core::fallback::sample_products;
use megacart_core::{Product, ProductId, default_categories, normalize_categories};

use crate::api::{ApiClient, ApiError};
use cache::{CacheKey, CacheValue};

/// Where the products on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Served by the backend (possibly from cache)
    #[default]
    Live,
    /// Built-in sample products; the backend could not be reached
    Fallback,
}

/// Result of [`CatalogService::load_products`].
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub products: Vec<Product>,
    pub source: DataSource,
}

/// Backend reachability as last observed by [`CatalogService::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl Connectivity {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Catalog reads against the backend.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service whose cached responses live for `ttl`.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { api, cache }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Load the product list.
    ///
    /// Network and status failures fall back to the sample catalog. A body
    /// that is reachable but malformed yields an empty live catalog.
    #[instrument(skip(self))]
    pub async fn load_products(&self) -> CatalogLoad {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return CatalogLoad {
                products,
                source: DataSource::Live,
            };
        }

        match self.api.fetch_products().await {
            Ok(products) => {
                self.cache
                    .insert(CacheKey::Products, CacheValue::Products(products.clone()))
                    .await;
                CatalogLoad {
                    products,
                    source: DataSource::Live,
                }
            }
            Err(ApiError::Parse(e)) => {
                tracing::warn!(error = %e, "Products response was not JSON, showing empty catalog");
                CatalogLoad {
                    products: Vec::new(),
                    source: DataSource::Live,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Products unavailable, using sample catalog");
                CatalogLoad {
                    products: sample_products(),
                    source: DataSource::Fallback,
                }
            }
        }
    }

    /// Load the category list, `"All"` first.
    ///
    /// Falls back to the default list when the backend fails or has no
    /// usable names.
    #[instrument(skip(self))]
    pub async fn load_categories(&self) -> Vec<String> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return categories;
        }

        match self.api.fetch_categories().await {
            Ok(body) => {
                let categories = normalize_categories(decode_categories(body));
                self.cache
                    .insert(
                        CacheKey::Categories,
                        CacheValue::Categories(categories.clone()),
                    )
                    .await;
                categories
            }
            Err(e) => {
                tracing::warn!(error = %e, "Categories unavailable, using defaults");
                default_categories()
            }
        }
    }

    /// Look up one product on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers with a
    /// status other than 2xx or 404.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let product = self.api.fetch_product(id).await?;
        if let Some(product) = &product {
            self.cache
                .insert(key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }
        Ok(product)
    }

    /// Check whether the backend answers its liveness probe.
    #[instrument(skip(self))]
    pub async fn probe(&self) -> Connectivity {
        match self.api.health().await {
            Ok(()) => Connectivity::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                Connectivity::Disconnected
            }
        }
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
