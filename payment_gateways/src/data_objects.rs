use serde::{Deserialize, Serialize};

/// A remote payment object created on the wallet provider. The customer must be redirected to
/// `approval_url` to approve the payment; `id` is the provider-side correlation key for webhook
/// events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    pub status: String,
    pub approval_url: String,
}

/// A provider-hosted checkout session. `url` is where the customer completes payment; `id` is the
/// session id that comes back in webhook events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Complete,
    Expired,
}

/// One display line of a hosted-checkout session. Unit prices are the server-side authoritative
/// figures; the client never supplies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub quantity: i64,
    /// Unit amount as a two-fraction-digit decimal string, e.g. "79.90"
    pub unit_amount: String,
}
