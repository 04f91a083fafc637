use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewCommission, NewLineItem, NewOrder, Order, OrderStatusType, PaymentMethod},
    events::{EventProducers, OrderCreatedEvent},
    flow_api::{
        checkout_objects::{BankDetails, BankInstructions, CartItem, CheckoutOutcome, NextAction, PlaceOrderRequest},
        errors::{CheckoutError, ValidationError},
    },
    helpers::{compute_authoritative_total, new_order_number},
    traits::{
        CatalogError,
        CatalogLookup,
        CheckoutDatabase,
        InsertOrderResult,
        PaymentInitRequest,
        PaymentInitiator,
    },
};

/// How many fresh order numbers to try before giving up on a pathological collision streak.
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

/// `CheckoutApi` is the checkout orchestrator: it validates the cart, re-derives the
/// authoritative total from the catalog, creates the order atomically and drives one of the
/// payment paths, returning a client-actionable result.
pub struct CheckoutApi<B, C, P> {
    db: B,
    catalog: C,
    initiator: P,
    bank: BankDetails,
    producers: EventProducers,
}

impl<B, C, P> Debug for CheckoutApi<B, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, C, P> CheckoutApi<B, C, P> {
    pub fn new(db: B, catalog: C, initiator: P, bank: BankDetails, producers: EventProducers) -> Self {
        Self { db, catalog, initiator, bank, producers }
    }
}

impl<B, C, P> CheckoutApi<B, C, P>
where
    B: CheckoutDatabase,
    C: CatalogLookup,
    P: PaymentInitiator,
{
    /// Places an order.
    ///
    /// The request is validated before anything is persisted or any provider is called; every
    /// rejection carries a machine-readable reason code. The order header, line items and frozen
    /// commission record are written in one transaction, keyed by the client's idempotency token:
    /// a double-submitted checkout returns the originally stored order instead of creating a
    /// second one. For the redirect paths, a replay whose original payment initiation failed
    /// retries the provider call against the *same* order.
    ///
    /// A provider failure after the commit does not roll the order back; it surfaces as
    /// [`CheckoutError::PaymentInitiation`], which carries the order number so the storefront can
    /// offer a retry or a different payment method.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let items = self.price_cart(&request.items).await?;
        let total = compute_authoritative_total(&items);
        if !total.is_positive() {
            return Err(ValidationError::NonPositiveAmount(total).into());
        }
        if request.client_total != total {
            return Err(ValidationError::TotalMismatch { expected: total, submitted: request.client_total }.into());
        }
        let commission = self.resolve_referral(request.referral_code.as_deref(), total).await?;

        let initial_status = match request.payment_method {
            PaymentMethod::BankTransfer => OrderStatusType::PendingPayment,
            PaymentMethod::Card | PaymentMethod::WalletRedirect => OrderStatusType::Pending,
        };
        let result = self.insert_with_fresh_number(&request, total, initial_status, &items, commission).await?;
        let order = result.order().clone();
        if !result.was_inserted() {
            info!("🛒️ Idempotency replay for order {}. Returning the stored result.", order.order_number);
            return self.replayed_outcome(order).await;
        }
        debug!("🛒️ Order {} persisted with id {} ({} {})", order.order_number, order.id, total, order.currency);

        let outcome = match request.payment_method {
            PaymentMethod::BankTransfer => {
                let instructions = BankInstructions::new(&self.bank, &order);
                Ok(CheckoutOutcome { action: NextAction::BankTransfer { instructions }, order: order.clone() })
            },
            PaymentMethod::Card | PaymentMethod::WalletRedirect => self.initiate_payment(order.clone(), &items).await,
        };
        // The order exists whether or not payment initiation succeeded, so the post-commit
        // fan-out (confirmation mail, admin alert) happens in both cases.
        self.call_order_created_hook(&order).await;
        outcome
    }

    /// Resolves each cart line against the catalog, copying the authoritative unit price into a
    /// line-item snapshot. Fails on an empty cart, a non-positive quantity, or a variant that is
    /// unknown or not currently sellable.
    async fn price_cart(&self, cart: &[CartItem]) -> Result<Vec<NewLineItem>, CheckoutError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        let mut items = Vec::with_capacity(cart.len());
        for line in cart {
            if line.quantity <= 0 {
                return Err(ValidationError::InvalidQuantity.into());
            }
            let variant = match self.catalog.resolve_variant(&line.product_id, &line.variant_id).await {
                Ok(v) => v,
                Err(CatalogError::UnknownVariant { product_id, variant_id }) => {
                    return Err(ValidationError::UnsellableVariant { product_id, variant_id }.into());
                },
                Err(CatalogError::LookupFailed(e)) => return Err(CheckoutError::CatalogUnavailable(e)),
            };
            if !variant.sellable {
                return Err(ValidationError::UnsellableVariant {
                    product_id: line.product_id.clone(),
                    variant_id: line.variant_id.clone(),
                }
                .into());
            }
            items.push(NewLineItem {
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                name: variant.display_name,
                quantity: line.quantity,
                unit_price: variant.unit_price,
                line_total: variant.unit_price * line.quantity,
            });
        }
        Ok(items)
    }

    /// Looks the referral code up among active partners and freezes the commission at the
    /// partner's *current* rate. An unknown or suspended code is not an error; the order simply
    /// carries no commission.
    async fn resolve_referral(
        &self,
        code: Option<&str>,
        total: sps_common::Money,
    ) -> Result<Option<NewCommission>, CheckoutError> {
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        match self.db.fetch_active_partner(code).await? {
            Some(partner) => {
                let amount = partner.commission_on(total);
                debug!("🛒️ Referral code {code} resolved to partner #{}. Commission frozen at {amount}", partner.id);
                Ok(Some(NewCommission { partner_id: partner.id, amount }))
            },
            None => {
                info!("🛒️ Referral code {code} does not match an active partner. No commission will accrue.");
                Ok(None)
            },
        }
    }

    async fn insert_with_fresh_number(
        &self,
        request: &PlaceOrderRequest,
        total: sps_common::Money,
        status: OrderStatusType,
        items: &[NewLineItem],
        commission: Option<NewCommission>,
    ) -> Result<InsertOrderResult, CheckoutError> {
        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order = NewOrder {
                order_number: new_order_number(),
                customer_id: request.customer.registered_id().map(String::from),
                customer_email: request.customer.guest_email().map(String::from),
                total_price: total,
                currency: request.currency.clone(),
                payment_method: request.payment_method,
                status,
                shipping_address: request.shipping_address.clone(),
                referral_code: request.referral_code.clone(),
                coupon_code: request.coupon_code.clone(),
                idempotency_key: request.idempotency_key.clone(),
            };
            match self.db.insert_order(order, items, commission.clone()).await {
                Ok(result) => return Ok(result),
                Err(crate::traits::CheckoutDbError::OrderNumberCollision(n)) => {
                    warn!("🛒️ Order number {n} collided on attempt {attempt}. Regenerating.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        Err(CheckoutError::OrderNumberExhausted(MAX_ORDER_NUMBER_ATTEMPTS))
    }

    /// Calls the payment initiator for an already-committed order and records the provider
    /// session on success. The order survives an initiation failure untouched.
    async fn initiate_payment(
        &self,
        order: Order,
        items: &[NewLineItem],
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let request = PaymentInitRequest {
            order_number: order.order_number.clone(),
            amount: order.total_price,
            currency: order.currency.clone(),
            method: order.payment_method,
            items: items.to_vec(),
        };
        match self.initiator.create_payment(&request).await {
            Ok(payment) => {
                let order = self
                    .db
                    .attach_payment_session(order.id, payment.provider, &payment.provider_ref, &payment.redirect_url)
                    .await?;
                info!(
                    "🛒️ Payment session {} ({}) attached to order {}",
                    payment.provider_ref, payment.provider, order.order_number
                );
                Ok(CheckoutOutcome { action: NextAction::Redirect { url: payment.redirect_url }, order })
            },
            Err(e) => {
                warn!("🛒️ Payment initiation failed for order {}. The order is saved. {e}", order.order_number);
                Err(CheckoutError::PaymentInitiation { order_number: order.order_number, source: e })
            },
        }
    }

    /// Rebuilds the original checkout result for a replayed idempotency key. No events fire and
    /// nothing is re-validated; the stored order is the source of truth. The one exception: a
    /// redirect-path order whose first initiation failed gets a fresh provider call, so the
    /// client's retry can actually succeed.
    async fn replayed_outcome(&self, order: Order) -> Result<CheckoutOutcome, CheckoutError> {
        match order.payment_method {
            PaymentMethod::BankTransfer => {
                let instructions = BankInstructions::new(&self.bank, &order);
                Ok(CheckoutOutcome { action: NextAction::BankTransfer { instructions }, order })
            },
            PaymentMethod::Card | PaymentMethod::WalletRedirect => match &order.redirect_url {
                Some(url) => {
                    Ok(CheckoutOutcome { action: NextAction::Redirect { url: url.clone() }, order: order.clone() })
                },
                None => {
                    let items = self.db.fetch_line_items(order.id).await?;
                    let items = items
                        .into_iter()
                        .map(|i| NewLineItem {
                            product_id: i.product_id,
                            variant_id: i.variant_id,
                            name: i.name,
                            quantity: i.quantity,
                            unit_price: i.unit_price,
                            line_total: i.line_total,
                        })
                        .collect::<Vec<_>>();
                    self.initiate_payment(order, &items).await
                },
            },
        }
    }

    async fn call_order_created_hook(&self, order: &Order) {
        if self.producers.order_created_producer.is_empty() {
            return;
        }
        let items = match self.db.fetch_line_items(order.id).await {
            Ok(items) => items,
            Err(e) => {
                error!("🛒️ Could not load line items for the order-created event on {}: {e}", order.order_number);
                Vec::new()
            },
        };
        for emitter in &self.producers.order_created_producer {
            debug!("🛒️ Notifying order-created hook subscribers for {}", order.order_number);
            let event = OrderCreatedEvent::new(order.clone(), items.clone());
            emitter.publish_event(event).await;
        }
    }
}
