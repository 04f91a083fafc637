use thiserror::Error;

use crate::{
    db_types::{CommissionRecord, Order, OrderLineItem, OrderNumber, PaymentProvider},
    flow_api::order_objects::OrderQueryFilter,
};

/// Read-only queries over the order store.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderQueryError>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError>;

    /// Fetches the order that a provider callback refers to, via the provider's own object id
    /// stored at payment initiation. This, not the order number, is the webhook correlation key.
    async fn fetch_order_by_provider_ref(
        &self,
        provider: PaymentProvider,
        provider_ref: &str,
    ) -> Result<Option<Order>, OrderQueryError>;

    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderQueryError>;

    async fn fetch_commission_for_order(&self, order_id: i64) -> Result<Option<CommissionRecord>, OrderQueryError>;

    /// Fetches orders according to criteria specified in the `OrderQueryFilter`, ordered by
    /// `created_at` ascending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for OrderQueryError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
