//! The notification dispatcher.
//!
//! Everything in here is best-effort: a send failure is logged, retried once after a short
//! pause, and then dropped. Nothing in this module can fail a checkout or a webhook call — the
//! dispatcher is only ever driven through the engine's event hooks, which run outside the
//! caller's request.
//!
//! Rendering is not done here. Each mail is a template id plus variables, posted to the external
//! mail API, which owns the actual HTML.
use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use checkout_engine::{
    db_types::{Order, OrderLineItem, PaymentMethod},
    events::{EventHooks, OrderCreatedEvent, OrderExpiredEvent, OrderPaidEvent},
    BankDetails,
    BankInstructions,
};
use log::*;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

const SEND_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Could not reach the mail API: {0}")]
    Transport(String),
    #[error("The mail API rejected the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    /// A guest email address, or a registered user id the mail API resolves itself
    pub to: String,
    pub subject: String,
    pub template: String,
    pub variables: serde_json::Value,
}

/// Delivery mechanism for [`MailMessage`]s. The production implementation posts to the mail API;
/// tests swap in a recording fake.
pub trait MailTransport: Clone + Send + Sync + 'static {
    fn send(&self, message: &MailMessage) -> impl Future<Output = Result<(), MailError>> + Send;
}

//--------------------------------------      HttpMailer      ---------------------------------------------------------
#[derive(Clone)]
pub struct HttpMailer {
    client: Arc<Client>,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(Self { client: Arc::new(client), config })
    }
}

impl MailTransport for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.config.api_url.is_empty() {
            debug!("✉️ No mail API configured. Dropping '{}' to {}", message.template, message.to);
            return Ok(());
        }
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.reveal())
            .json(message)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if response.status().is_success() {
            trace!("✉️ Mail '{}' accepted for {}", message.template, message.to);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(MailError::Rejected { status, message })
        }
    }
}

//--------------------------------------       Notifier       ---------------------------------------------------------
/// Builds and dispatches the transactional mails. Callable independently for each mail kind; the
/// event hooks below are just the default wiring.
#[derive(Clone)]
pub struct Notifier<M> {
    transport: M,
    shop_name: String,
    sender: String,
    admin_email: String,
}

impl<M: MailTransport> Notifier<M> {
    pub fn new(transport: M, shop_name: &str, sender: &str, admin_email: &str) -> Self {
        Self {
            transport,
            shop_name: shop_name.to_string(),
            sender: sender.to_string(),
            admin_email: admin_email.to_string(),
        }
    }

    /// The order-confirmation mail, including the bank-instructions block for manual transfers.
    pub async fn order_confirmation(&self, order: &Order, items: &[OrderLineItem], bank: Option<&BankInstructions>) {
        let Some(to) = order.contact() else {
            warn!("✉️ Order {} has no reachable customer. Skipping confirmation.", order.order_number);
            return;
        };
        let items = items
            .iter()
            .map(|i| {
                serde_json::json!({
                    "name": i.name,
                    "quantity": i.quantity,
                    "line_total": i.line_total.to_decimal_string(),
                })
            })
            .collect::<Vec<_>>();
        let message = MailMessage {
            to: to.to_string(),
            subject: format!("Your {} order {}", self.shop_name, order.order_number),
            template: "order_confirmation".to_string(),
            variables: serde_json::json!({
                "sender": self.sender,
                "order_number": order.order_number,
                "total": order.total_price.to_decimal_string(),
                "currency": order.currency,
                "items": items,
                "bank_instructions": bank,
            }),
        };
        self.dispatch(message).await;
    }

    /// Sent once, when the provider confirms payment.
    pub async fn payment_confirmation(&self, order: &Order) {
        let Some(to) = order.contact() else {
            return;
        };
        let message = MailMessage {
            to: to.to_string(),
            subject: format!("Payment received for order {}", order.order_number),
            template: "payment_confirmation".to_string(),
            variables: serde_json::json!({
                "sender": self.sender,
                "order_number": order.order_number,
                "total": order.total_price.to_decimal_string(),
                "currency": order.currency,
            }),
        };
        self.dispatch(message).await;
    }

    /// Sent by the (out-of-scope) fulfilment tooling once a shipment exists.
    pub async fn shipping_notice(&self, order: &Order, tracking_ref: &str) {
        let Some(to) = order.contact() else {
            return;
        };
        let message = MailMessage {
            to: to.to_string(),
            subject: format!("Your order {} is on its way", order.order_number),
            template: "shipping_notice".to_string(),
            variables: serde_json::json!({
                "sender": self.sender,
                "order_number": order.order_number,
                "tracking_ref": tracking_ref,
            }),
        };
        self.dispatch(message).await;
    }

    pub async fn admin_new_order_alert(&self, order: &Order) {
        if self.admin_email.is_empty() {
            return;
        }
        let message = MailMessage {
            to: self.admin_email.clone(),
            subject: format!("[{}] New order {}", self.shop_name, order.order_number),
            template: "admin_new_order".to_string(),
            variables: serde_json::json!({
                "order_number": order.order_number,
                "total": order.total_price.to_decimal_string(),
                "currency": order.currency,
                "payment_method": order.payment_method,
                "status": order.status,
            }),
        };
        self.dispatch(message).await;
    }

    /// Sends with a single retry. Never propagates an error to the caller.
    async fn dispatch(&self, message: MailMessage) {
        for attempt in 1..=2u8 {
            match self.transport.send(&message).await {
                Ok(()) => return,
                Err(e) => {
                    warn!("✉️ Sending '{}' to {} failed (attempt {attempt}): {e}", message.template, message.to);
                    if attempt == 1 {
                        tokio::time::sleep(SEND_RETRY_DELAY).await;
                    }
                },
            }
        }
        error!("✉️ Giving up on '{}' to {}. The mail has been dropped.", message.template, message.to);
    }
}

//--------------------------------------     Hook wiring      ---------------------------------------------------------
/// Subscribes the notifier to the engine's order events. This is the entire post-commit fan-out:
/// confirmation + admin alert on creation, payment confirmation on the paid transition.
pub fn build_event_hooks<M: MailTransport>(notifier: Notifier<M>, bank: BankDetails) -> EventHooks {
    let mut hooks = EventHooks::default();
    let on_created = notifier.clone();
    hooks.on_order_created(move |event: OrderCreatedEvent| {
        let notifier = on_created.clone();
        let bank = bank.clone();
        Box::pin(async move {
            let instructions = (event.order.payment_method == PaymentMethod::BankTransfer)
                .then(|| BankInstructions::new(&bank, &event.order));
            notifier.order_confirmation(&event.order, &event.items, instructions.as_ref()).await;
            notifier.admin_new_order_alert(&event.order).await;
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let on_paid = notifier;
    hooks.on_order_paid(move |event: OrderPaidEvent| {
        let notifier = on_paid.clone();
        Box::pin(async move {
            notifier.payment_confirmation(&event.order).await;
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_order_expired(move |event: OrderExpiredEvent| {
        Box::pin(async move {
            info!("✉️ Order {} expired unpaid. No customer mail is sent for expiry.", event.order.order_number);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}
