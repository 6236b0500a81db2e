//! Database service layer
//!
//! Bundles one gateway per collection behind trait objects so the services
//! never see which backend is in use.

use std::sync::Arc;

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::database::connection::{create_pool, run_migrations, DatabasePool};
use crate::database::memory::MemoryStore;
use crate::database::repositories::{
    AggregateRepository, EventRepository, GuestRepository, PgAggregateRepository,
    PgEventRepository, PgGuestRepository, PgRegistrationRepository, PgUserRepository,
    RegistrationRepository, UserRepository,
};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: Arc<dyn EventRepository>,
    pub guests: Arc<dyn GuestRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub aggregates: Arc<dyn AggregateRepository>,
}

impl DatabaseService {
    /// Gateways over a PostgreSQL pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            events: Arc::new(PgEventRepository::new(pool.clone())),
            guests: Arc::new(PgGuestRepository::new(pool.clone())),
            registrations: Arc::new(PgRegistrationRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            aggregates: Arc::new(PgAggregateRepository::new(pool)),
        }
    }

    /// Gateways sharing one in-process store
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            events: Arc::new(store.clone()),
            guests: Arc::new(store.clone()),
            registrations: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            aggregates: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Open the configured backend, running migrations for PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let pool = create_pool(config).await?;
                run_migrations(&pool).await?;
                Ok(Self::postgres(pool))
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory storage; data will not survive a restart");
                Ok(Self::in_memory())
            }
        }
    }
}
