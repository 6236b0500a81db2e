//! Guest model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::non_blank;

/// A guest is global; its event linkage lives in registrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Guest {
    /// Full name and at least one contact field are required
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(EventManagerError::validation("Guest full name is required"));
        }
        if self.email.is_none() && self.phone.is_none() {
            return Err(EventManagerError::validation(
                "Guest contact (email or phone) is required",
            ));
        }
        Ok(())
    }

    /// Fields searched by keyword listing
    pub fn searchable_fields(&self) -> [&str; 3] {
        [
            self.full_name.as_str(),
            self.email.as_deref().unwrap_or_default(),
            self.phone.as_deref().unwrap_or_default(),
        ]
    }
}

/// Blank contact values are treated as absent
pub fn normalize_contact(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(non_blank).map(str::to_string)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGuestRequest {
    pub id: Option<String>,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial update; unset fields keep the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGuestRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateGuestRequest {
    pub fn apply_to(self, prior: &Guest) -> Guest {
        let mut guest = prior.clone();
        if let Some(full_name) = self.full_name {
            guest.full_name = full_name.trim().to_string();
        }
        if let Some(email) = self.email {
            guest.email = normalize_contact(Some(email));
        }
        if let Some(phone) = self.phone {
            guest.phone = normalize_contact(Some(phone));
        }
        guest
    }
}
