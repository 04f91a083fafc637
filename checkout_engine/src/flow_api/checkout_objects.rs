use serde::{Deserialize, Serialize};
use sps_common::Money;

use crate::{
    db_types::{Address, Order, OrderNumber, PaymentMethod},
    flow_api::errors::ValidationError,
};

/// Everything the orchestrator needs to turn a cart into an order. Amounts are minor units; the
/// `client_total` is the figure the storefront computed and is used only as a consistency check.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItem>,
    pub client_total: Money,
    pub currency: String,
    pub customer: CustomerIdentity,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub referral_code: Option<String>,
    pub coupon_code: Option<String>,
    /// Client-generated token deduplicating double-submitted checkout attempts
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: i64,
}

/// Who is placing the order: a registered user id or a guest email, never both and never neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerIdentity {
    Registered(String),
    Guest(String),
}

impl CustomerIdentity {
    /// Builds the identity from the two optional wire fields, enforcing the
    /// exactly-one-of-the-two rule at the orchestrator boundary.
    pub fn try_new(customer_id: Option<String>, email: Option<String>) -> Result<Self, ValidationError> {
        let customer_id = customer_id.filter(|s| !s.trim().is_empty());
        let email = email.filter(|s| !s.trim().is_empty());
        match (customer_id, email) {
            (Some(id), None) => Ok(Self::Registered(id)),
            (None, Some(email)) => Ok(Self::Guest(email)),
            (None, None) => Err(ValidationError::MissingCustomer),
            (Some(_), Some(_)) => Err(ValidationError::AmbiguousCustomer),
        }
    }

    pub fn registered_id(&self) -> Option<&str> {
        match self {
            Self::Registered(id) => Some(id),
            Self::Guest(_) => None,
        }
    }

    pub fn guest_email(&self) -> Option<&str> {
        match self {
            Self::Registered(_) => None,
            Self::Guest(email) => Some(email),
        }
    }
}

/// The merchant's receiving account, rendered to the customer verbatim for manual transfers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankDetails {
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
}

/// The exact tuple rendered and emailed for a bank-transfer order. The reference is the order
/// number, unaltered — it is the only thing tying a future manual reconciliation to the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankInstructions {
    pub recipient: String,
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
    pub amount: Money,
    pub currency: String,
    pub reference: OrderNumber,
}

impl BankInstructions {
    pub fn new(details: &BankDetails, order: &Order) -> Self {
        Self {
            recipient: details.recipient.clone(),
            iban: details.iban.clone(),
            bic: details.bic.clone(),
            bank_name: details.bank_name.clone(),
            amount: order.total_price,
            currency: order.currency.clone(),
            reference: order.order_number.clone(),
        }
    }
}

/// What the storefront should do next to complete payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NextAction {
    /// Send the customer to the provider's approval/checkout page
    Redirect { url: String },
    /// Display (and email) these transfer instructions; the order waits for a manual transfer
    BankTransfer { instructions: BankInstructions },
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub action: NextAction,
}
