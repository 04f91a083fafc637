//! HTTP adapters for the two external payment providers.
//!
//! Both adapters are thin, stateless request/response wrappers: they hold a configured
//! [`reqwest::Client`] with a bounded timeout and translate provider responses into typed results.
//! The only piece of shared mutable state is the wallet adapter's cached OAuth2 bearer token,
//! which is refreshed on expiry behind an `RwLock`.
//!
//! Neither adapter touches the order store. Correlation with orders happens through the
//! `reference` (order number) and the provider's own object id, which the caller persists.
mod config;
mod data_objects;
mod error;
mod hosted;
mod wallet;

pub mod webhook_events;

pub use config::{HostedCheckoutConfig, WalletPayConfig};
pub use data_objects::{CheckoutSession, RemoteOrder, SessionLineItem, SessionStatus};
pub use error::GatewayApiError;
pub use hosted::HostedCheckoutApi;
pub use wallet::WalletPayApi;
