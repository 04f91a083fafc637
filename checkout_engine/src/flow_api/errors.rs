use sps_common::Money;
use thiserror::Error;

use crate::{
    db_types::OrderNumber,
    traits::{CheckoutDbError, OrderQueryError, PaymentInitError},
};

/// A checkout request rejected before any persistence or external call. Each variant maps to a
/// stable machine-readable reason code via [`ValidationError::code`].
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Either a customer id or a guest email is required")]
    MissingCustomer,
    #[error("A customer id and a guest email were both supplied; exactly one is required")]
    AmbiguousCustomer,
    #[error("Line quantities must be positive")]
    InvalidQuantity,
    #[error("Product {product_id} variant {variant_id} is not currently sellable")]
    UnsellableVariant { product_id: String, variant_id: String },
    #[error("Cart total mismatch: the server computed {expected}, the client submitted {submitted}")]
    TotalMismatch { expected: Money, submitted: Money },
    #[error("Order total must be positive, got {0}")]
    NonPositiveAmount(Money),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyCart => "empty_cart",
            ValidationError::MissingCustomer => "missing_customer",
            ValidationError::AmbiguousCustomer => "ambiguous_customer",
            ValidationError::InvalidQuantity => "invalid_quantity",
            ValidationError::UnsellableVariant { .. } => "unsellable_variant",
            ValidationError::TotalMismatch { .. } => "total_mismatch",
            ValidationError::NonPositiveAmount(_) => "non_positive_amount",
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Catalog lookup unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Database error: {0}")]
    Database(#[from] CheckoutDbError),
    #[error("Database error: {0}")]
    Query(#[from] OrderQueryError),
    /// The order is saved and payable; only the provider call failed. The order number lets the
    /// caller offer a retry without placing a second order.
    #[error("Order {order_number} was saved, but payment setup failed: {source}")]
    PaymentInitiation {
        order_number: OrderNumber,
        #[source]
        source: PaymentInitError,
    },
    #[error("Could not generate a unique order number after {0} attempts")]
    OrderNumberExhausted(usize),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Database error: {0}")]
    Database(#[from] CheckoutDbError),
    #[error("Database error: {0}")]
    Query(#[from] OrderQueryError),
}
