use std::sync::Arc;

use checkout_engine::traits::{CatalogError, CatalogLookup, VariantInfo};
use log::trace;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sps_common::Money;

use crate::{config::CatalogConfig, errors::ServerError};

/// The product catalog over HTTP. The catalog service owns products, variants and live prices;
/// the payment server only ever asks it to resolve a variant at checkout time.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Arc<Client>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct VariantResponse {
    display_name: String,
    unit_price: i64,
    sellable: bool,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { client: Arc::new(client), base_url: config.base_url.trim_end_matches('/').to_string() })
    }
}

impl CatalogLookup for HttpCatalog {
    async fn resolve_variant(&self, product_id: &str, variant_id: &str) -> Result<VariantInfo, CatalogError> {
        let url = format!("{}/products/{product_id}/variants/{variant_id}", self.base_url);
        trace!("🏷️ Resolving variant: {url}");
        let response = self.client.get(&url).send().await.map_err(|e| CatalogError::LookupFailed(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::UnknownVariant {
                product_id: product_id.to_string(),
                variant_id: variant_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(CatalogError::LookupFailed(format!("catalog returned {}", response.status())));
        }
        let variant =
            response.json::<VariantResponse>().await.map_err(|e| CatalogError::LookupFailed(e.to_string()))?;
        Ok(VariantInfo {
            display_name: variant.display_name,
            unit_price: Money::from_cents(variant.unit_price),
            sellable: variant.sellable,
        })
    }
}
