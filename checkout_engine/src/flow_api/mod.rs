//! # Checkout engine public API
//!
//! The `flow_api` module exposes the programmatic API for the checkout engine. The API is
//! modular, so that clients can pick and choose the functionality they want; the HTTP server
//! wires both APIs over the same SQLite backend, but nothing requires that.
//!
//! * [`checkout_api`] is the checkout orchestrator: cart validation, authoritative pricing,
//!   referral resolution, atomic order creation and payment-path dispatch.
//! * [`reconcile_api`] drives webhook-initiated order transitions idempotently.
//!
//! The other submodules in this module are support and utility objects and types.
//!
//! # API usage
//!
//! The pattern for both APIs is the same. An API instance is created by supplying a database
//! backend that implements the backend traits required by the API, plus the external
//! collaborators it orchestrates:
//!
//! ```rust,ignore
//! use checkout_engine::{CheckoutApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, catalog, initiator, bank_details, producers);
//! let outcome = api.place_order(request).await?;
//! ```

pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod order_objects;
pub mod query_api;
pub mod reconcile_api;
pub mod reconcile_objects;

pub use checkout_api::CheckoutApi;
pub use query_api::OrderQueryApi;
pub use reconcile_api::ReconcileApi;
