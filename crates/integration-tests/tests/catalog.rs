//! Catalog loading: caching, fallback and category normalization.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use megacart_core::fallback::sample_products;
use megacart_core::{ProductId, default_categories};
use megacart_integration_tests::{MockBackend, Reply, unreachable_api_config};
use megacart_storefront::{ApiClient, CatalogService, Connectivity, DataSource};
use serde_json::json;

fn service(backend: &MockBackend) -> CatalogService {
    CatalogService::new(
        ApiClient::new(&backend.api_config().unwrap()),
        Duration::from_secs(300),
    )
}

#[tokio::test]
async fn test_live_products_are_cached() {
    let backend = MockBackend::start().await.unwrap();
    let catalog = service(&backend);

    let first = catalog.load_products().await;
    let second = catalog.load_products().await;

    assert_eq!(first.source, DataSource::Live);
    assert_eq!(first.products, second.products);
    assert_eq!(backend.hits("products"), 1);

    catalog.invalidate();
    catalog.load_products().await;
    assert_eq!(backend.hits("products"), 2);
}

#[tokio::test]
async fn test_expired_cache_refetches() {
    let backend = MockBackend::start().await.unwrap();
    let catalog = CatalogService::new(
        ApiClient::new(&backend.api_config().unwrap()),
        Duration::from_millis(50),
    );

    catalog.load_products().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    catalog.load_products().await;

    assert_eq!(backend.hits("products"), 2);
}

#[tokio::test]
async fn test_server_error_falls_back_to_samples() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_products(Reply::detail(500, &json!("boom")));
    let catalog = service(&backend);

    let load = catalog.load_products().await;

    assert_eq!(load.source, DataSource::Fallback);
    assert_eq!(load.products, sample_products());
}

#[tokio::test]
async fn test_recovers_after_fallback() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_products(Reply::detail(500, &json!("boom")));
    let catalog = service(&backend);
    assert_eq!(catalog.load_products().await.source, DataSource::Fallback);

    backend.set_products(Reply::json(200, &json!([{"id": 10, "name": "Kettle", "price": 20}])));
    let load = catalog.load_products().await;

    assert_eq!(load.source, DataSource::Live);
    assert_eq!(load.products.len(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_falls_back() {
    let catalog = CatalogService::new(
        ApiClient::new(&unreachable_api_config().await.unwrap()),
        Duration::from_secs(300),
    );

    let load = catalog.load_products().await;
    assert_eq!(load.source, DataSource::Fallback);
    assert_eq!(catalog.load_categories().await, default_categories());
    assert_eq!(catalog.probe().await, Connectivity::Disconnected);
}

#[tokio::test]
async fn test_malformed_body_is_empty_live_catalog() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_products(Reply::raw(200, "this is not json"));
    let catalog = service(&backend);

    let load = catalog.load_products().await;

    assert_eq!(load.source, DataSource::Live);
    assert!(load.products.is_empty());
}

#[tokio::test]
async fn test_categories_are_normalized() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_categories(Reply::json(
        200,
        &json!(["Electronics", {"name": "Sports"}, "Electronics", " Home ", "", 42, {"label": "x"}]),
    ));
    let catalog = service(&backend);

    assert_eq!(
        catalog.load_categories().await,
        vec!["All", "Electronics", "Sports", "Home"]
    );
}

#[tokio::test]
async fn test_empty_categories_use_defaults() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_categories(Reply::json(200, &json!([])));
    let catalog = service(&backend);

    assert_eq!(catalog.load_categories().await, default_categories());
}

#[tokio::test]
async fn test_categories_error_uses_defaults() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_categories(Reply::detail(500, &json!("boom")));
    let catalog = service(&backend);

    assert_eq!(catalog.load_categories().await, default_categories());
}

#[tokio::test]
async fn test_probe_does_not_affect_catalog() {
    let backend = MockBackend::start().await.unwrap();
    backend.set_healthy(false);
    let catalog = service(&backend);

    assert_eq!(catalog.probe().await, Connectivity::Disconnected);
    assert_eq!(catalog.load_products().await.source, DataSource::Live);
}

#[tokio::test]
async fn test_find_product_is_cached() {
    let backend = MockBackend::start().await.unwrap();
    let catalog = service(&backend);

    let product = catalog.find_product(ProductId::new(1)).await.unwrap().unwrap();
    assert_eq!(product.name, "Wireless Headphones");
    catalog.find_product(ProductId::new(1)).await.unwrap();
    assert_eq!(backend.hits("product"), 1);

    assert!(catalog.find_product(ProductId::new(404)).await.unwrap().is_none());
}
