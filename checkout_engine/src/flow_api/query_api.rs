use crate::{
    db_types::{Order, OrderLineItem, OrderNumber},
    flow_api::order_objects::OrderQueryFilter,
    traits::{OrderManagement, OrderQueryError},
};

/// Read-only order queries for the HTTP surface (status polls, admin listings).
#[derive(Debug, Clone)]
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError> {
        self.db.fetch_order_by_number(number).await
    }

    pub async fn line_items_for(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderQueryError> {
        self.db.fetch_line_items(order_id).await
    }

    pub async fn search(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        self.db.search_orders(filter).await
    }
}
