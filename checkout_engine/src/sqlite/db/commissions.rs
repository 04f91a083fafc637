use sqlx::SqliteConnection;

use crate::{
    db_types::{CommissionRecord, NewCommission},
    traits::CheckoutDbError,
};

/// Inserts the frozen commission record for an order. The unique constraint on `order_id`
/// enforces at-most-once per order; tripping it is reported as [`CheckoutDbError::DuplicateCommission`].
pub(crate) async fn insert_commission(
    order_id: i64,
    commission: NewCommission,
    conn: &mut SqliteConnection,
) -> Result<CommissionRecord, CheckoutDbError> {
    let result: Result<CommissionRecord, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO commissions (order_id, partner_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(commission.partner_id)
    .bind(commission.amount.value())
    .fetch_one(conn)
    .await;
    result.map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.message().contains("commissions.order_id") => {
            CheckoutDbError::DuplicateCommission(order_id)
        },
        _ => CheckoutDbError::DatabaseError(e),
    })
}

pub async fn fetch_commission_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CommissionRecord>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM commissions WHERE order_id = $1").bind(order_id).fetch_optional(conn).await
}

/// Flips `eligible_at` exactly once. A record that is already eligible is left untouched and
/// `None` is returned, so duplicate payment events cannot double-accrue.
pub(crate) async fn mark_eligible(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CommissionRecord>, CheckoutDbError> {
    let result: Option<CommissionRecord> = sqlx::query_as(
        r#"
            UPDATE commissions
            SET eligible_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND eligible_at IS NULL
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}
