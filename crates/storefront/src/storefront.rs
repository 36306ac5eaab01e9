//! Storefront view-model.
//!
//! Commands mutate state and return nothing to render; queries read it back.
//! The presentation layer decides when to re-render.

use rust_decimal::Decimal;
use tracing::instrument;

use megacart_core::{Cart, CatalogView, FilterState, Product, ProductId, default_categories};

use crate::catalog::{CatalogService, Connectivity, DataSource};
use crate::error::{Result, StorefrontError, add_breadcrumb};

/// Catalog, filter and cart state for one shopper.
pub struct Storefront {
    catalog: CatalogService,
    view: CatalogView,
    cart: Cart,
    categories: Vec<String>,
    connectivity: Connectivity,
    source: DataSource,
}

impl Storefront {
    /// An empty storefront. Call [`Storefront::load`] to populate it.
    #[must_use]
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog,
            view: CatalogView::default(),
            cart: Cart::new(),
            categories: default_categories(),
            connectivity: Connectivity::Unknown,
            source: DataSource::Live,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Fetch products and categories and probe the backend, concurrently.
    ///
    /// The filter state and cart survive a reload.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let (connectivity, load, categories) = tokio::join!(
            self.catalog.probe(),
            self.catalog.load_products(),
            self.catalog.load_categories(),
        );

        tracing::info!(
            products = load.products.len(),
            categories = categories.len(),
            source = ?load.source,
            connectivity = ?connectivity,
            "Catalog loaded"
        );

        self.connectivity = connectivity;
        self.source = load.source;
        self.view.replace_products(load.products);
        self.categories = categories;
    }

    /// Drop cached responses and load again.
    pub async fn reload(&mut self) {
        self.catalog.invalidate();
        self.load().await;
    }

    pub fn set_search_term(&mut self, search_term: impl Into<String>) {
        self.view.set_search_term(search_term);
    }

    pub fn select_category(&mut self, category: impl Into<String>) {
        self.view.select_category(category);
    }

    pub const fn set_price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        self.view.set_price_range(min, max);
    }

    /// Replace search, category and price range at once.
    pub fn set_filter_state(&mut self, state: FilterState) {
        self.view.set_filter_state(state);
    }

    /// Add `quantity` of a loaded product to the cart. Zero changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::UnknownProduct`] if `id` is not in the
    /// loaded catalog.
    pub fn add_to_cart(&mut self, id: ProductId, quantity: u32) -> Result<()> {
        let product = self
            .view
            .find(id)
            .ok_or(StorefrontError::UnknownProduct(id))?;
        if quantity == 0 {
            return Ok(());
        }
        self.cart.add_to_cart(product, quantity);

        let id = id.to_string();
        let quantity = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", id.as_str()), ("quantity", quantity.as_str())]),
        );
        Ok(())
    }

    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.cart.remove_from_cart(id);
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", id.to_string().as_str())]),
        );
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        self.cart.update_quantity(id, quantity);
        let id = id.to_string();
        let quantity = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated cart quantity",
            Some(&[("product_id", id.as_str()), ("quantity", quantity.as_str())]),
        );
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        add_breadcrumb("cart", "Cleared cart", None);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Products matching the current filter, in catalog order.
    ///
    /// Takes `&mut self` because the filtered list is memoized.
    pub fn visible_products(&mut self) -> Vec<&Product> {
        self.view.visible()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.view.products()
    }

    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.view.find(id)
    }

    #[must_use]
    pub const fn filter_state(&self) -> &FilterState {
        self.view.filter_state()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    #[must_use]
    pub const fn data_source(&self) -> DataSource {
        self.source
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogService {
        &self.catalog
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::ApiConfig;

    async fn offline_storefront() -> Storefront {
        let config = ApiConfig::new("http://127.0.0.1:1/api").unwrap();
        let catalog = CatalogService::new(ApiClient::new(&config), Duration::from_secs(60));
        let mut storefront = Storefront::new(catalog);
        storefront.load().await;
        storefront
    }

    #[tokio::test]
    async fn test_offline_load_shows_sample_catalog() {
        let mut storefront = offline_storefront().await;

        assert_eq!(storefront.data_source(), DataSource::Fallback);
        assert_eq!(storefront.connectivity(), Connectivity::Disconnected);
        assert!(!storefront.is_connected());
        assert_eq!(storefront.categories(), default_categories().as_slice());
        assert_eq!(storefront.visible_products().len(), 8);
    }

    #[tokio::test]
    async fn test_filter_commands() {
        let mut storefront = offline_storefront().await;

        storefront.select_category("Sports");
        assert_eq!(storefront.visible_products().len(), 2);

        storefront.set_search_term("MAT");
        let names: Vec<_> = storefront
            .visible_products()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Yoga Mat"]);

        storefront.set_filter_state(FilterState::default());
        storefront.set_price_range(Some(Decimal::from(5_000)), None);
        assert!(
            storefront
                .visible_products()
                .iter()
                .all(|p| p.price >= Decimal::from(5_000))
        );
    }

    #[tokio::test]
    async fn test_cart_commands() {
        let mut storefront = offline_storefront().await;
        let headphones = ProductId::new(1);
        let mat = ProductId::new(4);

        storefront.add_to_cart(headphones, 1).unwrap();
        storefront.add_to_cart(headphones, 1).unwrap();
        storefront.add_to_cart(mat, 3).unwrap();
        assert_eq!(storefront.cart().line_count(), 2);
        assert_eq!(storefront.cart().total_item_count(), 5);

        storefront.update_quantity(mat, 0);
        assert!(storefront.cart().get(mat).is_none());

        storefront.remove_from_cart(headphones);
        assert!(storefront.cart().is_empty());

        storefront.add_to_cart(mat, 1).unwrap();
        storefront.clear_cart();
        assert!(storefront.cart().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_leaves_no_breadcrumb() {
        let mut storefront = offline_storefront().await;

        let events = sentry::test::with_captured_events(|| {
            storefront.add_to_cart(ProductId::new(1), 0).unwrap();
            storefront.add_to_cart(ProductId::new(1), 2).unwrap();
            sentry::capture_message("cart snapshot", sentry::Level::Info);
        });

        let event = events.first().unwrap();
        let added: Vec<_> = event
            .breadcrumbs
            .values
            .iter()
            .filter(|crumb| crumb.message.as_deref() == Some("Added to cart"))
            .collect();
        assert_eq!(added.len(), 1);
        assert_eq!(
            added.first().unwrap().data.get("quantity"),
            Some(&serde_json::Value::String("2".to_string()))
        );
        assert_eq!(storefront.cart().total_item_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let mut storefront = offline_storefront().await;
        let err = storefront.add_to_cart(ProductId::new(999), 1).unwrap_err();
        assert!(matches!(err, StorefrontError::UnknownProduct(id) if id == ProductId::new(999)));
        assert!(storefront.cart().is_empty());
    }

    #[tokio::test]
    async fn test_reload_keeps_cart_and_filter() {
        let mut storefront = offline_storefront().await;
        storefront.add_to_cart(ProductId::new(3), 2).unwrap();
        storefront.select_category("Home");

        storefront.reload().await;

        assert_eq!(storefront.cart().total_item_count(), 2);
        assert_eq!(storefront.filter_state().selected_category, "Home");
        assert_eq!(storefront.visible_products().len(), 2);
    }
}
