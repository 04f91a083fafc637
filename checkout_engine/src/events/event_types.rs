use serde::{Deserialize, Serialize};

use crate::db_types::{CommissionRecord, Order, OrderLineItem};

/// Emitted after an order has been durably committed, whatever the payment path. Carries the
/// line items so subscribers (confirmation mail, admin alert) never have to read the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<OrderLineItem>) -> Self {
        Self { order, items }
    }
}

/// Emitted exactly once per order, on the `Pending` → `Paid` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    /// The commission record that became eligible with this payment, if the order carried one
    pub commission: Option<CommissionRecord>,
}

impl OrderPaidEvent {
    pub fn new(order: Order, commission: Option<CommissionRecord>) -> Self {
        Self { order, commission }
    }
}

/// Emitted exactly once per order, on the `Pending` → `Expired` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderExpiredEvent {
    pub order: Order,
}

impl OrderExpiredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
