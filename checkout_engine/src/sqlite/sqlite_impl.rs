//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{commissions, new_pool, orders, partners};
use crate::{
    db_types::{
        CommissionRecord,
        NewCommission,
        NewLineItem,
        NewOrder,
        Order,
        OrderLineItem,
        OrderNumber,
        OrderStatusType,
        Partner,
        PaymentProvider,
    },
    flow_api::order_objects::OrderQueryFilter,
    sqlite::db::orders::UniqueViolation,
    traits::{CheckoutDatabase, CheckoutDbError, InsertOrderResult, OrderManagement, OrderQueryError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, CheckoutDbError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewLineItem],
        commission: Option<NewCommission>,
    ) -> Result<InsertOrderResult, CheckoutDbError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = orders::fetch_order_by_idempotency_key(&order.idempotency_key, &mut tx).await? {
            debug!(
                "🗃️ Idempotency key {} already maps to order {}. Nothing inserted.",
                order.idempotency_key, existing.order_number
            );
            return Ok(InsertOrderResult::AlreadyExists(existing));
        }
        let number = order.order_number.clone();
        let key = order.idempotency_key.clone();
        let inserted = match orders::insert_order(order, &mut tx).await {
            Ok(o) => o,
            Err(CheckoutDbError::DatabaseError(e)) => {
                return match orders::violated_constraint(&e) {
                    Some(UniqueViolation::OrderNumber) => Err(CheckoutDbError::OrderNumberCollision(number.0)),
                    // A concurrent request with the same key won the race between our lookup and
                    // this insert. Hand back what it wrote.
                    Some(UniqueViolation::IdempotencyKey) => {
                        drop(tx);
                        let mut conn = self.pool.acquire().await?;
                        let existing = orders::fetch_order_by_idempotency_key(&key, &mut conn)
                            .await?
                            .ok_or(CheckoutDbError::DatabaseError(e))?;
                        Ok(InsertOrderResult::AlreadyExists(existing))
                    },
                    None => Err(CheckoutDbError::DatabaseError(e)),
                };
            },
            Err(e) => return Err(e),
        };
        orders::insert_line_items(inserted.id, items, &mut tx).await?;
        if let Some(commission) = commission {
            let record = commissions::insert_commission(inserted.id, commission, &mut tx).await?;
            debug!("🗃️ Commission #{} frozen at {} for order {}", record.id, record.amount, inserted.order_number);
        }
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", inserted.order_number, inserted.id);
        Ok(InsertOrderResult::Inserted(inserted))
    }

    async fn attach_payment_session(
        &self,
        order_id: i64,
        provider: PaymentProvider,
        provider_ref: &str,
        redirect_url: &str,
    ) -> Result<Order, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::attach_payment_session(order_id, provider, provider_ref, redirect_url, &mut conn).await
    }

    async fn transition_status(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::update_order_status(order_id, expected, new_status, &mut conn).await?;
        match &result {
            Some(order) => trace!("🗃️ Order {} moved {expected} → {new_status}", order.order_number),
            None => trace!("🗃️ Order #{order_id} was not in status {expected}. Transition skipped."),
        }
        Ok(result)
    }

    async fn fetch_active_partner(&self, code: &str) -> Result<Option<Partner>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        Ok(partners::fetch_active_partner(code, &mut conn).await?)
    }

    async fn mark_commission_eligible(&self, order_id: i64) -> Result<Option<CommissionRecord>, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        commissions::mark_eligible(order_id, &mut conn).await
    }

    async fn append_admin_note(&self, order_id: i64, note: &str) -> Result<Order, CheckoutDbError> {
        let mut conn = self.pool.acquire().await?;
        orders::append_admin_note(order_id, note, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(orders::fetch_order_by_id(id, &mut conn).await?)
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    async fn fetch_order_by_provider_ref(
        &self,
        provider: PaymentProvider,
        provider_ref: &str,
    ) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(orders::fetch_order_by_provider_ref(provider, provider_ref, &mut conn).await?)
    }

    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(orders::fetch_line_items(order_id, &mut conn).await?)
    }

    async fn fetch_commission_for_order(&self, order_id: i64) -> Result<Option<CommissionRecord>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(commissions::fetch_commission_for_order(order_id, &mut conn).await?)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(|e| OrderQueryError::DatabaseError(e.to_string()))?;
        Ok(orders::search_orders(query, &mut conn).await?)
    }
}
