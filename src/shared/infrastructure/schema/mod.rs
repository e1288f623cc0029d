use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("DATABASE_URL is not configured")]
    NotConfigured,

    #[error("database connection failed: {0}")]
    Connect(String),

    #[error("failed to create table {table}: {reason}")]
    Statement { table: &'static str, reason: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Ensures the tables the platform writes to exist. Implementations must be
/// idempotent: calling `create_tables` on an already provisioned database is
/// a no-op.
#[async_trait]
pub trait SchemaInitializer: Send + Sync {
    async fn create_tables(&self) -> Result<(), SchemaError>;
}

pub mod in_memory;
pub mod postgres;
