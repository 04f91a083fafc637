use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sps_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------     OrderNumber      ---------------------------------------------------------
/// The human-facing order reference. It doubles as the payment memo for manual bank transfers,
/// so it is the sole correlation key for that path and must never be truncated or reformatted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order exists and a payment-provider flow has been initiated. Advanced only by the
    /// webhook reconciler.
    Pending,
    /// A bank-transfer order awaiting a manual transfer. There is no automated callback for this
    /// path; only an explicit admin action advances it.
    PendingPayment,
    /// Payment has been received in full.
    Paid,
    /// The provider session expired before the customer paid.
    Expired,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::PendingPayment => write!(f, "PendingPayment"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Expired => write!(f, "Expired"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "PendingPayment" => Ok(Self::PendingPayment),
            "Paid" => Ok(Self::Paid),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    WalletRedirect,
    BankTransfer,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::WalletRedirect => write!(f, "wallet_redirect"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "wallet_redirect" => Ok(Self::WalletRedirect),
            "bank_transfer" => Ok(Self::BankTransfer),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------   PaymentProvider     ---------------------------------------------------------
/// The external provider a pending payment was initiated with. Together with the provider's own
/// object id this is the webhook correlation key; order numbers are never used for correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Wallet,
    HostedCheckout,
}

impl Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::Wallet => write!(f, "wallet"),
            PaymentProvider::HostedCheckout => write!(f, "hosted_checkout"),
        }
    }
}

//--------------------------------------       Address         ---------------------------------------------------------
/// A shipping/billing address as captured at order time. Orders store a serialized snapshot of
/// this struct, never a reference to a live, mutable address record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub total_price: Money,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    /// JSON snapshot of the shipping address at order time
    pub shipping_address: String,
    pub referral_code: Option<String>,
    pub coupon_code: Option<String>,
    pub provider: Option<PaymentProvider>,
    pub provider_ref: Option<String>,
    pub redirect_url: Option<String>,
    pub idempotency_key: String,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn address(&self) -> Result<Address, ConversionError> {
        serde_json::from_str(&self.shipping_address)
            .map_err(|e| ConversionError(format!("Stored address snapshot is not valid JSON: {e}")))
    }

    /// The address the customer confirmation mail should greet, whichever identity was supplied.
    pub fn contact(&self) -> Option<&str> {
        self.customer_email.as_deref().or(self.customer_id.as_deref())
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The server-generated, collision-resistant order number
    pub order_number: OrderNumber,
    /// Registered user id. Mutually exclusive with `customer_email`; at least one is required.
    pub customer_id: Option<String>,
    /// Guest checkout email
    pub customer_email: Option<String>,
    /// The server-recomputed total, in minor units. Never the client-submitted figure.
    pub total_price: Money,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub shipping_address: Address,
    pub referral_code: Option<String>,
    pub coupon_code: Option<String>,
    /// Client-supplied checkout dedup token
    pub idempotency_key: String,
}

//--------------------------------------    OrderLineItem      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    pub variant_id: String,
    /// Denormalized display name at the time of purchase
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: String,
    pub variant_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

//--------------------------------------       Partner         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Partner {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Commission rate in basis points (1/100th of a percent)
    pub rate_basis_points: i64,
    pub status: PartnerStatus,
    pub created_at: DateTime<Utc>,
}

impl Partner {
    /// The commission owed on the given subtotal at this partner's current rate. Callers freeze
    /// the result at order-creation time; a later rate change never touches existing records.
    pub fn commission_on(&self, subtotal: Money) -> Money {
        Money::from(subtotal.value() * self.rate_basis_points / 10_000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type)]
pub enum PartnerStatus {
    Active,
    Suspended,
}

impl Display for PartnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartnerStatus::Active => write!(f, "Active"),
            PartnerStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

//--------------------------------------  CommissionRecord     ---------------------------------------------------------
/// A frozen, per-order snapshot of referral commission owed to a partner. Created at most once
/// per order (unique constraint on the order id), in the same transaction as the order itself.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: i64,
    pub order_id: i64,
    pub partner_id: i64,
    pub amount: Money,
    pub status: CommissionStatus,
    /// Set exactly once, when the order transitions to `Paid`
    pub eligible_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum CommissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommissionStatus::Pending => write!(f, "Pending"),
            CommissionStatus::Approved => write!(f, "Approved"),
            CommissionStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCommission {
    pub partner_id: i64,
    pub amount: Money,
}
