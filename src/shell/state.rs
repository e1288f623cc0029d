use crate::modules::auth::adapters::outbound::accounts_in_memory::InMemoryAccounts;
use crate::modules::auth::adapters::outbound::accounts_postgres::PostgresAccounts;
use crate::modules::auth::core::ports::AccountRepository;
use crate::modules::care_records::adapters::outbound::records_in_memory::InMemoryCareRecords;
use crate::modules::care_records::adapters::outbound::records_postgres::PostgresCareRecords;
use crate::modules::care_records::core::ports::{AppointmentRepository, PrescriptionRepository};
use crate::shared::infrastructure::realtime::SocketManager;
use crate::shell::config::Settings;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub accounts: Arc<dyn AccountRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub prescriptions: Arc<dyn PrescriptionRepository>,
    pub socket_manager: SocketManager,
}

impl AppState {
    /// Wires every route group to the in-memory adapters.
    pub fn in_memory(settings: Settings, socket_manager: SocketManager) -> Self {
        let records = Arc::new(InMemoryCareRecords::new());
        Self {
            settings: Arc::new(settings),
            accounts: Arc::new(InMemoryAccounts::new()),
            appointments: records.clone(),
            prescriptions: records,
            socket_manager,
        }
    }

    /// Wires every route group to Postgres through one shared pool.
    pub fn postgres(settings: Settings, socket_manager: SocketManager, pool: PgPool) -> Self {
        let records = Arc::new(PostgresCareRecords::new(pool.clone()));
        Self {
            settings: Arc::new(settings),
            accounts: Arc::new(PostgresAccounts::new(pool)),
            appointments: records.clone(),
            prescriptions: records,
            socket_manager,
        }
    }
}
