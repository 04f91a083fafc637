use sps_common::Money;
use thiserror::Error;

use crate::db_types::{NewLineItem, OrderNumber, PaymentMethod, PaymentProvider};

/// The payment-gateway client at its interface: create a provider-side payment object for an
/// already-persisted order. One implementation routes between the configured provider adapters
/// based on the order's payment method.
///
/// Initiators are called *after* the order is durably committed; a failure here must not unwind
/// the order, only surface a retry-capable error to the caller.
#[allow(async_fn_in_trait)]
pub trait PaymentInitiator: Clone {
    async fn create_payment(&self, request: &PaymentInitRequest) -> Result<InitiatedPayment, PaymentInitError>;
}

#[derive(Debug, Clone)]
pub struct PaymentInitRequest {
    pub order_number: OrderNumber,
    pub amount: Money,
    pub currency: String,
    pub method: PaymentMethod,
    /// The authoritative line items, for providers that display them on the hosted page
    pub items: Vec<NewLineItem>,
}

/// What the provider gave us back: its own id for the payment object (the webhook correlation
/// key) and the URL the customer must be redirected to.
#[derive(Debug, Clone)]
pub struct InitiatedPayment {
    pub provider: PaymentProvider,
    pub provider_ref: String,
    pub redirect_url: String,
}

#[derive(Debug, Error)]
pub enum PaymentInitError {
    #[error("The provider rejected the payment request: {0}")]
    Rejected(String),
    #[error("Could not authenticate with the provider: {0}")]
    AuthFailed(String),
    #[error("The provider did not respond in time: {0}")]
    Timeout(String),
    #[error("No payment provider is configured for method {0}")]
    UnsupportedMethod(String),
}
