//! # Storefront payment server
//! This crate hosts the HTTP surface of the order & payment orchestration subsystem. It is
//! responsible for:
//! * Accepting checkout requests from the storefront and driving the checkout orchestrator.
//! * Listening for incoming webhook requests from the payment providers, verifying their
//!   signatures, and feeding them to the webhook reconciler.
//! * Fanning out best-effort notifications (customer confirmation, admin alert) via the
//!   engine's event hooks.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout`: Turns a cart into an order and returns the client-actionable payment step.
//! * `/order/{order_number}`: Order-status poll for the storefront UI.
//! * `/webhook/wallet`, `/webhook/checkout`: Provider callback routes, behind signature checks.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod notifier;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
