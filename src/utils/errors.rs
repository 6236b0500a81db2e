//! Error handling for the event manager
//!
//! This module defines the main error type used throughout the application
//! and the classification used to map failures onto client or server responses.

use std::time::Duration;
use thiserror::Error;

/// Main error type for the event manager
#[derive(Error, Debug)]
pub enum EventManagerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{operation} failed: {source}")]
    Storage {
        operation: String,
        #[source]
        source: Box<EventManagerError>,
    },

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for event manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
    Config,
}

impl EventManagerError {
    pub fn validation(message: impl Into<String>) -> Self {
        EventManagerError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EventManagerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventManagerError::Validation(_) => ErrorKind::Validation,
            EventManagerError::NotFound { .. } => ErrorKind::NotFound,
            EventManagerError::Conflict(_) => ErrorKind::Conflict,
            EventManagerError::Config(_) => ErrorKind::Config,
            EventManagerError::Database(_)
            | EventManagerError::Migration(_)
            | EventManagerError::Storage { .. }
            | EventManagerError::Timeout(_)
            | EventManagerError::ObjectStorage(_)
            | EventManagerError::Serialization(_)
            | EventManagerError::Io(_) => ErrorKind::Storage,
        }
    }

    /// Response status a transport layer should use for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Storage | ErrorKind::Config => 500,
        }
    }

    /// Attach operation context to storage failures.
    ///
    /// Domain errors (validation, not found, conflict) and failures that already
    /// carry context pass through unchanged.
    pub fn in_operation(self, operation: &str) -> Self {
        match self {
            EventManagerError::Database(_)
            | EventManagerError::Timeout(_)
            | EventManagerError::ObjectStorage(_)
            | EventManagerError::Serialization(_)
            | EventManagerError::Io(_) => EventManagerError::Storage {
                operation: operation.to_string(),
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// True when the underlying failure was a storage timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            EventManagerError::Timeout(_) => true,
            EventManagerError::Storage { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventManagerError::Database(_) => false,
            EventManagerError::Migration(_) => false,
            EventManagerError::Config(_) => false,
            EventManagerError::Validation(_) => false,
            EventManagerError::NotFound { .. } => false,
            EventManagerError::Conflict(_) => false,
            EventManagerError::Storage { source, .. } => source.is_recoverable(),
            EventManagerError::Timeout(_) => true,
            EventManagerError::ObjectStorage(_) => true,
            EventManagerError::Serialization(_) => false,
            EventManagerError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventManagerError::Database(_) => ErrorSeverity::Critical,
            EventManagerError::Migration(_) => ErrorSeverity::Critical,
            EventManagerError::Config(_) => ErrorSeverity::Critical,
            EventManagerError::Conflict(_) => ErrorSeverity::Warning,
            EventManagerError::NotFound { .. } => ErrorSeverity::Info,
            EventManagerError::Validation(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
