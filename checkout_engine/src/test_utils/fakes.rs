//! In-memory fakes for the engine's external collaborators, so that flow tests exercise the real
//! store without any network.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use sps_common::Money;

use crate::{
    db_types::PaymentProvider,
    traits::{
        CatalogError,
        CatalogLookup,
        InitiatedPayment,
        PaymentInitError,
        PaymentInitRequest,
        PaymentInitiator,
        VariantInfo,
    },
};

/// A catalog backed by a map of `(product_id, variant_id)` → variant info.
#[derive(Debug, Clone, Default)]
pub struct FakeCatalog {
    variants: HashMap<(String, String), VariantInfo>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variant(mut self, product_id: &str, variant_id: &str, name: &str, unit_price: Money) -> Self {
        let info = VariantInfo { display_name: name.to_string(), unit_price, sellable: true };
        self.variants.insert((product_id.to_string(), variant_id.to_string()), info);
        self
    }

    pub fn with_unsellable_variant(mut self, product_id: &str, variant_id: &str, name: &str) -> Self {
        let info = VariantInfo { display_name: name.to_string(), unit_price: Money::default(), sellable: false };
        self.variants.insert((product_id.to_string(), variant_id.to_string()), info);
        self
    }
}

impl CatalogLookup for FakeCatalog {
    async fn resolve_variant(&self, product_id: &str, variant_id: &str) -> Result<VariantInfo, CatalogError> {
        self.variants.get(&(product_id.to_string(), variant_id.to_string())).cloned().ok_or_else(|| {
            CatalogError::UnknownVariant { product_id: product_id.to_string(), variant_id: variant_id.to_string() }
        })
    }
}

/// A payment initiator that either succeeds with a deterministic session or fails, and counts
/// how often it was called so tests can assert "no adapter call was made".
#[derive(Clone, Default)]
pub struct FakeInitiator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeInitiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { calls: Arc::new(AtomicUsize::new(0)), fail: true }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentInitiator for FakeInitiator {
    async fn create_payment(&self, request: &PaymentInitRequest) -> Result<InitiatedPayment, PaymentInitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PaymentInitError::Rejected("fake initiator is configured to fail".into()));
        }
        let provider = match request.method {
            crate::db_types::PaymentMethod::WalletRedirect => PaymentProvider::Wallet,
            _ => PaymentProvider::HostedCheckout,
        };
        Ok(InitiatedPayment {
            provider,
            provider_ref: format!("fake-{}", request.order_number),
            redirect_url: format!("https://pay.example/approve/{}", request.order_number),
        })
    }
}
