use log::*;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub mod commissions;
pub mod orders;
pub mod partners;

pub fn db_url() -> String {
    std::env::var("SPS_DATABASE_URL").unwrap_or_else(|_| {
        error!("🗃️ SPS_DATABASE_URL is not set. Please set it to the URL for the order store.");
        String::default()
    })
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new().max_connections(max_connections).connect(url).await
}
