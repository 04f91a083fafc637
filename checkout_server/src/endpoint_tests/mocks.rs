use checkout_engine::{
    db_types::{CommissionRecord, Order, OrderLineItem, OrderNumber, PaymentProvider},
    traits::{OrderManagement, OrderQueryError},
    OrderQueryFilter,
};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_by_provider_ref(&self, provider: PaymentProvider, provider_ref: &str) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderQueryError>;
        async fn fetch_commission_for_order(&self, order_id: i64) -> Result<Option<CommissionRecord>, OrderQueryError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
    }
}
