use crate::db_types::{Order, PaymentProvider};

/// A verified, understood provider callback, reduced to what reconciliation needs. Parsing the
/// provider-specific wire shapes (and verifying their signatures) happens upstream, at the HTTP
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub provider: PaymentProvider,
    /// The provider's own id for the payment object, as stored at initiation time
    pub reference: String,
    pub kind: ProviderEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventKind {
    PaymentSucceeded,
    SessionExpired,
}

/// The result of processing a provider event. Every variant is acknowledged upstream with a 2xx;
/// providers retry on anything else.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The order actually changed status; side effects have been fanned out exactly once.
    Transitioned(Order),
    /// The event was a duplicate or arrived after a terminal status; nothing changed and no side
    /// effects were repeated.
    AlreadyFinal(Order),
    /// No order matches the provider reference. Acknowledged so the provider stops retrying.
    UnknownReference,
}
