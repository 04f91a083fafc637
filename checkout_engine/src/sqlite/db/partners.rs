use sqlx::SqliteConnection;

use crate::db_types::{Partner, PartnerStatus};

/// Looks a referral code up among active partners. Suspended partners resolve to `None`, the
/// same as unknown codes; the caller proceeds without a commission either way.
pub async fn fetch_active_partner(code: &str, conn: &mut SqliteConnection) -> Result<Option<Partner>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM partners WHERE code = $1 AND status = 'Active'")
        .bind(code)
        .fetch_optional(conn)
        .await
}

/// Registers a partner. Partner management is an admin concern; this exists for seeding and
/// tests.
pub async fn insert_partner(
    code: &str,
    name: &str,
    rate_basis_points: i64,
    status: PartnerStatus,
    conn: &mut SqliteConnection,
) -> Result<Partner, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO partners (code, name, rate_basis_points, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(rate_basis_points)
    .bind(status.to_string())
    .fetch_one(conn)
    .await
}
