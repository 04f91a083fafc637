use sps_common::Money;
use thiserror::Error;

/// The product catalog, reduced to the one question the orchestrator asks of it: what does this
/// variant cost right now, and may it be sold? Unit prices returned here are the authoritative
/// figures copied into order line items; client-submitted prices are never used.
#[allow(async_fn_in_trait)]
pub trait CatalogLookup: Clone {
    async fn resolve_variant(&self, product_id: &str, variant_id: &str) -> Result<VariantInfo, CatalogError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub display_name: String,
    pub unit_price: Money,
    pub sellable: bool,
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("No such variant: product {product_id}, variant {variant_id}")]
    UnknownVariant { product_id: String, variant_id: String },
    #[error("Catalog lookup failed: {0}")]
    LookupFailed(String),
}
