//! End-to-end view-model flows over the mock backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use megacart_core::{FilterState, ProductId};
use megacart_integration_tests::{MockBackend, Reply};
use megacart_storefront::{
    ApiClient, CatalogService, Connectivity, DataSource, Storefront, StorefrontError,
};
use rust_decimal::Decimal;
use serde_json::json;

async fn loaded(backend: &MockBackend) -> Storefront {
    let catalog = CatalogService::new(
        ApiClient::new(&backend.api_config().unwrap()),
        Duration::from_secs(300),
    );
    let mut storefront = Storefront::new(catalog);
    storefront.load().await;
    storefront
}

fn names(storefront: &mut Storefront) -> Vec<String> {
    storefront
        .visible_products()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

#[tokio::test]
async fn test_load_populates_everything() {
    let backend = MockBackend::start().await.unwrap();
    let mut storefront = loaded(&backend).await;

    assert_eq!(storefront.connectivity(), Connectivity::Connected);
    assert_eq!(storefront.data_source(), DataSource::Live);
    assert_eq!(storefront.categories(), ["All", "Electronics", "Sports", "Home"]);
    assert_eq!(names(&mut storefront).len(), 4);
}

#[tokio::test]
async fn test_search_and_category() {
    let backend = MockBackend::start().await.unwrap();
    let mut storefront = loaded(&backend).await;

    storefront.set_search_term("PHONE");
    assert_eq!(names(&mut storefront), vec!["Wireless Headphones"]);

    storefront.set_filter_state(FilterState::new("", "Sports"));
    assert_eq!(names(&mut storefront), vec!["Running Shoes", "Yoga Mat"]);

    storefront.select_category("Toys");
    assert!(names(&mut storefront).is_empty());

    storefront.set_filter_state(FilterState::default());
    storefront.set_price_range(Some(Decimal::from(40)), Some(Decimal::from(55)));
    assert_eq!(names(&mut storefront), vec!["Running Shoes", "Coffee Maker"]);
}

#[tokio::test]
async fn test_cart_totals() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_products(Reply::json(
        200,
        &json!([
            {"id": 1, "name": "A", "price": 100},
            {"id": 2, "name": "B", "price": 50}
        ]),
    ));
    let mut storefront = loaded(&backend).await;

    storefront.add_to_cart(ProductId::new(1), 1).unwrap();
    storefront.add_to_cart(ProductId::new(1), 1).unwrap();
    storefront.add_to_cart(ProductId::new(2), 1).unwrap();

    let cart = storefront.cart();
    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
    assert_eq!(cart.total_price(), Decimal::from(250));
    assert_eq!(cart.total_item_count(), 3);

    storefront.update_quantity(ProductId::new(1), -5);
    assert_eq!(storefront.cart().total_price(), Decimal::from(50));
}

#[tokio::test]
async fn test_unknown_product() {
    let backend = MockBackend::start().await.unwrap();
    let mut storefront = loaded(&backend).await;

    let err = storefront.add_to_cart(ProductId::new(77), 1).unwrap_err();

    assert!(matches!(err, StorefrontError::UnknownProduct(_)));
    assert_eq!(err.user_message(), "That product is not available");
}

#[tokio::test]
async fn test_offline_then_reload() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_products(Reply::detail(500, &json!("boom")));
    backend.set_healthy(false);
    let mut storefront = loaded(&backend).await;

    assert_eq!(storefront.data_source(), DataSource::Fallback);
    assert!(!storefront.is_connected());
    storefront.add_to_cart(ProductId::new(1), 1).unwrap();

    backend.set_products(Reply::json(200, &json!([{"id": 1, "name": "Live", "price": 1}])));
    backend.set_healthy(true);
    storefront.reload().await;

    assert_eq!(storefront.data_source(), DataSource::Live);
    assert!(storefront.is_connected());
    assert_eq!(names(&mut storefront), vec!["Live"]);
    // The cart holds a snapshot of the sample product
    assert_eq!(
        storefront.cart().get(ProductId::new(1)).unwrap().product.name,
        "Wireless Headphones"
    );
}
