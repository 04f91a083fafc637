use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewLineItem, NewOrder, Order, OrderLineItem, OrderNumber, OrderStatusType, PaymentProvider},
    flow_api::order_objects::OrderQueryFilter,
    traits::CheckoutDbError,
};

/// Which unique constraint a failed insert tripped. Order-number collisions are retried with a
/// fresh number; idempotency-key collisions mean a concurrent replay won the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UniqueViolation {
    OrderNumber,
    IdempotencyKey,
}

pub(crate) fn violated_constraint(e: &sqlx::Error) -> Option<UniqueViolation> {
    let sqlx::Error::Database(db_err) = e else {
        return None;
    };
    let message = db_err.message();
    if message.contains("orders.order_number") {
        Some(UniqueViolation::OrderNumber)
    } else if message.contains("orders.idempotency_key") {
        Some(UniqueViolation::IdempotencyKey)
    } else {
        None
    }
}

/// Inserts a new order header using the given connection. This is not atomic on its own; callers
/// embed it in a transaction together with [`insert_line_items`] and the commission insert, and
/// pass `&mut *tx` as the connection argument.
pub(crate) async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutDbError> {
    let address = serde_json::to_string(&order.shipping_address)
        .map_err(|e| CheckoutDbError::AddressSnapshot(e.to_string()))?;
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                customer_id,
                customer_email,
                total_price,
                currency,
                payment_method,
                status,
                shipping_address,
                referral_code,
                coupon_code,
                idempotency_key
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(order.order_number)
    .bind(order.customer_id)
    .bind(order.customer_email)
    .bind(order.total_price.value())
    .bind(order.currency)
    .bind(order.payment_method)
    .bind(order.status)
    .bind(address)
    .bind(order.referral_code)
    .bind(order.coupon_code)
    .bind(order.idempotency_key)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub(crate) async fn insert_line_items(
    order_id: i64,
    items: &[NewLineItem],
    conn: &mut SqliteConnection,
) -> Result<(), CheckoutDbError> {
    for item in items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_id, variant_id, name, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7);
            "#,
        )
        .bind(order_id)
        .bind(&item.product_id)
        .bind(&item.variant_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price.value())
        .bind(item.line_total.value())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_number = $1").bind(number.as_str()).fetch_optional(conn).await
}

pub async fn fetch_order_by_idempotency_key(
    key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE idempotency_key = $1").bind(key).fetch_optional(conn).await
}

pub async fn fetch_order_by_provider_ref(
    provider: PaymentProvider,
    provider_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE provider = $1 AND provider_ref = $2")
        .bind(provider)
        .bind(provider_ref)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_line_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

/// Records the provider-side payment session for an order. Set once at initiation time.
pub(crate) async fn attach_payment_session(
    order_id: i64,
    provider: PaymentProvider,
    provider_ref: &str,
    redirect_url: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutDbError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET provider = $1, provider_ref = $2, redirect_url = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(provider)
    .bind(provider_ref)
    .bind(redirect_url)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(CheckoutDbError::OrderIdNotFound(order_id))
}

/// The conditional status transition: updates the status only when the current stored status
/// matches `expected`. `None` means the guard was stale, which is exactly the idempotency signal
/// the webhook reconciler needs. Two concurrent deliveries for the same order cannot both
/// observe a successful update.
pub(crate) async fn update_order_status(
    order_id: i64,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, CheckoutDbError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(new_status)
    .bind(order_id)
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

pub(crate) async fn append_admin_note(
    order_id: i64,
    note: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutDbError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET admin_notes = COALESCE(admin_notes || char(10), '') || $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(note)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(CheckoutDbError::OrderIdNotFound(order_id))
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(number) = query.order_number {
        where_clause.push("order_number = ");
        where_clause.push_bind_unseparated(number.to_string());
    }
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(currency) = query.currency {
        where_clause.push("currency = ");
        where_clause.push_bind_unseparated(currency);
    }
    if let Some(method) = query.payment_method {
        where_clause.push("payment_method = ");
        where_clause.push_bind_unseparated(method.to_string());
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let mut statuses = vec![];
        query.status.as_ref().unwrap().iter().for_each(|s| {
            statuses.push(format!("'{s}'"));
        });
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
