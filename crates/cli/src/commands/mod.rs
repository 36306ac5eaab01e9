//! Subcommand implementations.

pub mod auth;
pub mod catalog;
pub mod shop;

use megacart_storefront::{ApiClient, CatalogService, FileTokenStore, Session, StorefrontConfig};

type CliSession = Session<ApiClient, FileTokenStore>;

fn catalog_service(config: &StorefrontConfig) -> CatalogService {
    CatalogService::new(ApiClient::new(&config.api), config.cache_ttl)
}

fn session(config: &StorefrontConfig) -> CliSession {
    Session::new(
        ApiClient::new(&config.api),
        FileTokenStore::new(&config.token_path),
    )
}
