use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderStatusType},
    events::{EventProducers, OrderExpiredEvent, OrderPaidEvent},
    flow_api::{
        errors::ReconcileError,
        reconcile_objects::{ProviderEvent, ProviderEventKind, ReconcileOutcome},
    },
    traits::CheckoutDatabase,
};

/// `ReconcileApi` maps verified provider callbacks onto order-status transitions.
///
/// Providers deliver at least once, and two deliveries for the same order can race. The only
/// concurrency primitive used here is the store's conditional update ("transition only if the
/// current status is `Pending`"); whichever delivery loses the race observes a stale guard and
/// acknowledges without repeating side effects.
pub struct ReconcileApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconcileApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcileApi")
    }
}

impl<B> ReconcileApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ReconcileApi<B>
where B: CheckoutDatabase
{
    /// Processes one provider event.
    ///
    /// The order is correlated via the provider's own object id stored at payment initiation,
    /// never by order number. On an actual `Pending` → `Paid` transition the commission record
    /// (if any) is marked eligible and the order-paid hook fires — exactly once, guarded by the
    /// same conditional update that performed the transition.
    pub async fn handle_event(&self, event: ProviderEvent) -> Result<ReconcileOutcome, ReconcileError> {
        let order = self.db.fetch_order_by_provider_ref(event.provider, &event.reference).await?;
        let Some(order) = order else {
            warn!("🧾️ No order matches {} reference {}. Acknowledging and ignoring.", event.provider, event.reference);
            return Ok(ReconcileOutcome::UnknownReference);
        };
        match event.kind {
            ProviderEventKind::PaymentSucceeded => self.payment_succeeded(order).await,
            ProviderEventKind::SessionExpired => self.session_expired(order).await,
        }
    }

    async fn payment_succeeded(&self, order: Order) -> Result<ReconcileOutcome, ReconcileError> {
        match self.db.transition_status(order.id, OrderStatusType::Pending, OrderStatusType::Paid).await? {
            Some(paid) => {
                info!("🧾️ Order {} is paid.", paid.order_number);
                let commission = self.db.mark_commission_eligible(paid.id).await?;
                if let Some(c) = &commission {
                    debug!("🧾️ Commission #{} ({}) on order {} is now eligible", c.id, c.amount, paid.order_number);
                }
                self.call_order_paid_hook(&paid, commission).await;
                Ok(ReconcileOutcome::Transitioned(paid))
            },
            None => {
                debug!(
                    "🧾️ Duplicate or late payment event for order {} (status {}). No side effects.",
                    order.order_number, order.status
                );
                Ok(ReconcileOutcome::AlreadyFinal(order))
            },
        }
    }

    async fn session_expired(&self, order: Order) -> Result<ReconcileOutcome, ReconcileError> {
        match self.db.transition_status(order.id, OrderStatusType::Pending, OrderStatusType::Expired).await? {
            Some(expired) => {
                info!("🧾️ Order {} expired before payment.", expired.order_number);
                self.call_order_expired_hook(&expired).await;
                Ok(ReconcileOutcome::Transitioned(expired))
            },
            None => {
                debug!(
                    "🧾️ Expiry event for order {} ignored (status {}).",
                    order.order_number, order.status
                );
                Ok(ReconcileOutcome::AlreadyFinal(order))
            },
        }
    }

    async fn call_order_paid_hook(&self, order: &Order, commission: Option<crate::db_types::CommissionRecord>) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🧾️ Notifying order-paid hook subscribers for {}", order.order_number);
            let event = OrderPaidEvent::new(order.clone(), commission.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_expired_hook(&self, order: &Order) {
        for emitter in &self.producers.order_expired_producer {
            debug!("🧾️ Notifying order-expired hook subscribers for {}", order.order_number);
            let event = OrderExpiredEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }
}
