// In memory implementation of the SchemaInitializer port.
//
// Purpose
// - Exercise the startup hook without a database.
//
// Responsibilities
// - Count how often table creation was requested.
// - Fail on demand when toggled offline.

use crate::shared::infrastructure::schema::{SchemaError, SchemaInitializer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct InMemorySchema {
    calls: AtomicUsize,
    provisioned: AtomicBool,
    offline: AtomicBool,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn is_provisioned(&self) -> bool {
        self.provisioned.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SchemaInitializer for InMemorySchema {
    async fn create_tables(&self) -> Result<(), SchemaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(SchemaError::Backend("Database offline".into()));
        }
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }
}
