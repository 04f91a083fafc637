//! Webhook payload types for both providers.
//!
//! These are the raw wire shapes. Mapping to order transitions happens in the server's webhook
//! routes; unrecognised event types must be acknowledged there, never rejected.
use serde::{Deserialize, Serialize};

/// Event types the hosted-checkout provider sends that we act on.
pub const HOSTED_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const HOSTED_SESSION_EXPIRED: &str = "checkout.session.expired";

/// Event types the wallet provider sends that we act on.
pub const WALLET_ORDER_COMPLETED: &str = "CHECKOUT.ORDER.COMPLETED";
pub const WALLET_ORDER_EXPIRED: &str = "CHECKOUT.ORDER.EXPIRED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: HostedEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedEventData {
    pub object: HostedSessionObject,
}

/// The session object embedded in a hosted-checkout event. `id` is the session id we stored when
/// the session was created; `reference` repeats the order number for log correlation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedSessionObject {
    pub id: String,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEvent {
    pub id: String,
    pub event_type: String,
    pub resource: WalletResource,
}

/// The resource embedded in a wallet event. `id` is the remote order id we stored when the wallet
/// order was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResource {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}
