//! Checkout Engine
//!
//! The checkout engine turns a validated cart into a persisted order, drives one of several
//! payment paths, and reconciles asynchronous provider callbacks. This library contains the core
//! logic; it is HTTP-framework-agnostic and provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). The engine ships a SQLite backend; the
//!    [`traits`] module defines what any backend must provide. You should never need to access
//!    the database directly. The exception is the data types used in the database, which are
//!    defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@flow_api`]). [`flow_api::CheckoutApi`] is the checkout
//!    orchestrator: validation, authoritative pricing, atomic order creation and payment
//!    dispatch. [`flow_api::ReconcileApi`] drives the webhook-initiated status transitions
//!    idempotently.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted
//! when orders are created, paid or expired, and carry everything a subscriber needs to fan out
//! best-effort side effects (confirmation mail, admin alerts) without touching engine state.
pub mod db_types;
pub mod events;
pub mod helpers;
mod flow_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use flow_api::{
    checkout_objects::{
        BankDetails,
        BankInstructions,
        CartItem,
        CheckoutOutcome,
        CustomerIdentity,
        NextAction,
        PlaceOrderRequest,
    },
    errors::{CheckoutError, ReconcileError, ValidationError},
    order_objects::OrderQueryFilter,
    reconcile_objects::{ProviderEvent, ProviderEventKind, ReconcileOutcome},
    CheckoutApi,
    OrderQueryApi,
    ReconcileApi,
};
