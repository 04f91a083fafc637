use thiserror::Error;

use crate::{
    db_types::{
        CommissionRecord,
        NewCommission,
        NewLineItem,
        NewOrder,
        Order,
        OrderStatusType,
        Partner,
        PaymentProvider,
    },
    traits::OrderManagement,
};

/// The result of an idempotent order insert.
#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    /// The order (with its line items and commission record, if any) was written.
    Inserted(Order),
    /// An order with the same idempotency key already existed; this is the stored order.
    AlreadyExists(Order),
}

impl InsertOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOrderResult::Inserted(_))
    }
}

/// The highest level of behaviour a backend must provide to support the checkout engine.
///
/// This is the **only** component allowed to mutate order status. Everything else goes through
/// the conditional [`CheckoutDatabase::transition_status`] primitive, which serializes concurrent
/// transitions per order without any global lock.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction, stores the order header, its line
    /// items and the frozen commission record (if a referral resolved). Both-or-neither: a
    /// failure leaves nothing behind.
    ///
    /// The call is idempotent on the order's `idempotency_key`: a replay returns the previously
    /// stored order without writing anything.
    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewLineItem],
        commission: Option<NewCommission>,
    ) -> Result<InsertOrderResult, CheckoutDbError>;

    /// Records the provider-side payment object created for this order, along with the redirect
    /// URL handed to the client. Set once, at payment initiation; the `(provider, provider_ref)`
    /// pair is the webhook correlation key.
    async fn attach_payment_session(
        &self,
        order_id: i64,
        provider: PaymentProvider,
        provider_ref: &str,
        redirect_url: &str,
    ) -> Result<Order, CheckoutDbError>;

    /// Transitions the order's status, but only if the current stored status equals `expected`.
    ///
    /// Returns `None` when the guard is stale (the order is not in the expected status), which is
    /// the idempotency signal for at-least-once webhook delivery: the caller acknowledges without
    /// repeating side effects. Returns the updated order on an actual transition.
    async fn transition_status(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, CheckoutDbError>;

    /// Looks up an active partner by referral code. Suspended partners and unknown codes both
    /// resolve to `None`; the checkout proceeds without a commission in that case.
    async fn fetch_active_partner(&self, code: &str) -> Result<Option<Partner>, CheckoutDbError>;

    /// Marks the order's commission record as eligible for payout. At most once: a record whose
    /// `eligible_at` is already set is left untouched and `None` is returned.
    async fn mark_commission_eligible(&self, order_id: i64) -> Result<Option<CommissionRecord>, CheckoutDbError>;

    /// Appends to the order's admin-notes field, the only free-text field that stays mutable
    /// after the order is persisted.
    async fn append_admin_note(&self, order_id: i64, note: &str) -> Result<Order, CheckoutDbError>;
}

#[derive(Debug, Error)]
pub enum CheckoutDbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Order number {0} is already taken")]
    OrderNumberCollision(String),
    #[error("Order id {0} not found")]
    OrderIdNotFound(i64),
    #[error("Order {0} already has a commission record")]
    DuplicateCommission(i64),
    #[error("Could not serialize the address snapshot: {0}")]
    AddressSnapshot(String),
}
