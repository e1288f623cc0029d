// PostgreSQL implementation of the SchemaInitializer port.
//
// Runs every CREATE TABLE IF NOT EXISTS statement in dependency order on the
// shared pool. The same pool later backs the Postgres repositories.

use crate::shared::infrastructure::schema::{SchemaError, SchemaInitializer};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

pub const TABLES: [(&str, &str); 5] = [
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) UNIQUE NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'patient',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR(64) PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "appointments",
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id BIGSERIAL PRIMARY KEY,
            patient_id BIGINT NOT NULL REFERENCES users(id),
            doctor_id BIGINT REFERENCES users(id),
            type VARCHAR(32) NOT NULL DEFAULT 'consultation',
            test_name VARCHAR(255),
            reason TEXT,
            appointment_time TIMESTAMP NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "appointments",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS appointments_doctor_slot
            ON appointments (doctor_id, appointment_time)
            WHERE type = 'consultation' AND status <> 'cancelled';
        "#,
    ),
    (
        "prescriptions",
        r#"
        CREATE TABLE IF NOT EXISTS prescriptions (
            id BIGSERIAL PRIMARY KEY,
            patient_id BIGINT NOT NULL REFERENCES users(id),
            file_name VARCHAR(1024) NOT NULL,
            size_bytes BIGINT NOT NULL DEFAULT 0,
            extracted_data TEXT,
            status VARCHAR(32) NOT NULL DEFAULT 'preparing',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    ),
];

pub struct PostgresSchema {
    pool: Option<PgPool>,
}

impl PostgresSchema {
    /// `None` means no `DATABASE_URL` was configured.
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaInitializer for PostgresSchema {
    async fn create_tables(&self) -> Result<(), SchemaError> {
        let pool = self.pool.as_ref().ok_or(SchemaError::NotConfigured)?;
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| SchemaError::Connect(e.to_string()))?;

        for (table, statement) in TABLES {
            debug!(table, "ensuring schema object exists");
            sqlx::query(statement)
                .execute(&mut *conn)
                .await
                .map_err(|e| SchemaError::Statement {
                    table,
                    reason: e.to_string(),
                })?;
        }

        info!(statements = TABLES.len(), "database schema ensured");
        Ok(())
    }
}
