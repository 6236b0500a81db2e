//! Event Manager
//!
//! Backend core for running events: event lifecycle with time-derived status,
//! guest registration coordination, attendance statistics and live analytics
//! over registrations, on PostgreSQL or an in-process store.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ErrorKind, EventManagerError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
