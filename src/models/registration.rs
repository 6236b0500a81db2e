//! Registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registration status values used by the domain; the stored field is free text
pub mod status {
    pub const PENDING: &str = "pending";
    pub const CHECKED_IN: &str = "checked_in";
    pub const CANCELLED: &str = "cancelled";
}

/// Binding between one guest and one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub guest_id: String,
    pub status: String,
    pub checked_in: bool,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Mark attendance; only an unset or pending status is promoted
    pub fn check_in(&mut self) {
        self.checked_in = true;
        if self.status.is_empty() || self.status == status::PENDING {
            self.status = status::CHECKED_IN.to_string();
        }
    }

    /// Cancellation always clears attendance
    pub fn cancel(&mut self) {
        self.status = status::CANCELLED.to_string();
        self.checked_in = false;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub id: Option<String>,
    pub event_id: String,
    pub guest_id: String,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
