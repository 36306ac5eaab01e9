//! Read-only catalog commands.

use megacart_core::{CatalogView, FilterState};
use megacart_storefront::{DataSource, StorefrontConfig};

use crate::render;

/// Print the products that match `filter`.
#[allow(clippy::print_stdout)]
pub async fn products(config: &StorefrontConfig, filter: FilterState) {
    let load = super::catalog_service(config).load_products().await;
    if load.source == DataSource::Fallback {
        println!("{}", render::OFFLINE_NOTICE);
    }

    let mut view = CatalogView::new(load.products);
    view.set_filter_state(filter);
    println!("{}", render::product_table(&view.visible()));
}

#[allow(clippy::print_stdout)]
pub async fn categories(config: &StorefrontConfig) {
    for category in super::catalog_service(config).load_categories().await {
        println!("{category}");
    }
}

#[allow(clippy::print_stdout)]
pub async fn status(config: &StorefrontConfig) {
    let connectivity = super::catalog_service(config).probe().await;
    println!(
        "{} ({})",
        render::connectivity(connectivity),
        config.api.health_url
    );
}
