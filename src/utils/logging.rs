//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the event manager.

use std::path::Path;

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::{EventManagerError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let path = Path::new(&config.file_path);
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "event-manager.log".into());

    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| EventManagerError::Config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout))
            .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init()
    };
    result.map_err(|e| EventManagerError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: &str, action: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        details = details,
        "Event action performed"
    );
}

/// Log guest actions
pub fn log_guest_action(guest_id: &str, action: &str, event_id: Option<&str>) {
    info!(
        guest_id = guest_id,
        action = action,
        event_id = event_id,
        "Guest action performed"
    );
}

/// Log registration state changes
pub fn log_registration_action(registration_id: &str, action: &str, status: &str, checked_in: bool) {
    info!(
        registration_id = registration_id,
        action = action,
        status = status,
        checked_in = checked_in,
        "Registration action performed"
    );
}

/// Log the outcome of a status reconciliation pass
pub fn log_status_reconciliation(scanned: usize, changed: usize, duration_ms: u64) {
    if changed > 0 {
        info!(
            scanned = scanned,
            changed = changed,
            duration_ms = duration_ms,
            "Event statuses reconciled"
        );
    } else {
        debug!(scanned = scanned, duration_ms = duration_ms, "Event statuses already current");
    }
}

/// Log compensation steps taken after a partial failure
pub fn log_compensation(entity: &str, id: &str, reason: &str, succeeded: bool) {
    if succeeded {
        warn!(entity = entity, id = id, reason = reason, "Compensating delete applied");
    } else {
        error!(entity = entity, id = id, reason = reason, "Compensating delete failed");
    }
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
