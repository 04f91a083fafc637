use checkout_engine::{
    db_types::{Address, OrderNumber, OrderStatusType, PaymentMethod},
    CartItem,
    CheckoutOutcome,
    CustomerIdentity,
    NextAction,
    PlaceOrderRequest,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use sps_common::Money;
use std::fmt::Display;

/// The wire shape of a checkout request. Amounts are integer minor units; `client_total` is the
/// figure the storefront displayed and is used purely as a consistency check server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub client_total: i64,
    pub currency: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub idempotency_key: String,
}

impl CheckoutRequest {
    pub fn try_into_place_order(self) -> Result<PlaceOrderRequest, ValidationError> {
        let customer = CustomerIdentity::try_new(self.customer_id, self.customer_email)?;
        Ok(PlaceOrderRequest {
            items: self.items,
            client_total: Money::from_cents(self.client_total),
            currency: self.currency,
            customer,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            referral_code: self.referral_code,
            coupon_code: self.coupon_code,
            idempotency_key: self.idempotency_key,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_number: OrderNumber,
    pub status: OrderStatusType,
    pub next: NextAction,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self { order_number: outcome.order.order_number.clone(), status: outcome.order.status, next: outcome.action }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub order_number: OrderNumber,
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}
