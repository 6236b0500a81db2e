//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use uuid::Uuid;

use crate::utils::errors::{EventManagerError, Result};

/// Generate a new opaque identity
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Use the given identity when present, otherwise generate one
pub fn ensure_id(id: Option<String>) -> String {
    id.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_id)
}

/// Run a storage call under a bounded timeout.
///
/// Failures are wrapped with the operation name; an elapsed timeout surfaces as
/// a storage error carrying [`EventManagerError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(|e| e.in_operation(operation)),
        Err(_) => Err(EventManagerError::Timeout(limit).in_operation(operation)),
    }
}

/// Trimmed value, or `None` when blank
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Reject a blank identifier argument
pub fn require_id<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    non_blank(value).ok_or_else(|| EventManagerError::validation(format!("{} is required", what)))
}

/// Case-insensitive substring match of a lowercased keyword against any field
pub fn matches_keyword(keyword: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(keyword))
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"))
        .is_match(email)
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
