use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub const MAX_CONNECTIONS: u32 = 10;
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the shared pool without touching the network. Connections are
/// opened on first use, so an unreachable server surfaces as a query error
/// instead of failing boot.
pub fn lazy_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    lazy_pool_with_timeout(database_url, ACQUIRE_TIMEOUT)
}

pub fn lazy_pool_with_timeout(
    database_url: &str,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(Duration::from_secs(600))
        .connect_lazy(database_url)
}

/// Postgres reports unique constraint violations as SQLSTATE 23505.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
