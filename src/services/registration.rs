//! Registration service implementation

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::database::repositories::RegistrationRepository;
use crate::models::registration::{status, RegisterRequest, Registration};
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::{ensure_id, non_blank, require_id, with_timeout};
use crate::utils::logging::log_registration_action;

#[derive(Clone)]
pub struct RegistrationService {
    registrations: Arc<dyn RegistrationRepository>,
    timeout: Duration,
}

impl RegistrationService {
    pub fn new(registrations: Arc<dyn RegistrationRepository>, timeout: Duration) -> Self {
        Self {
            registrations,
            timeout,
        }
    }

    /// Record a registration; status defaults to pending and time to now
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration> {
        let event_id = require_id(&request.event_id, "Event ID")?.to_string();
        let guest_id = require_id(&request.guest_id, "Guest ID")?.to_string();

        let registration = Registration {
            id: ensure_id(request.id),
            event_id,
            guest_id,
            status: request
                .status
                .as_deref()
                .and_then(non_blank)
                .unwrap_or(status::PENDING)
                .to_string(),
            checked_in: false,
            created_at: request.created_at.unwrap_or_else(Utc::now),
        };

        with_timeout(
            self.timeout,
            "create registration",
            self.registrations.insert(&registration),
        )
        .await?;

        log_registration_action(&registration.id, "registered", &registration.status, false);
        Ok(registration)
    }

    pub async fn check_in(&self, id: &str) -> Result<Registration> {
        let mut registration = self.load(id).await?;
        registration.check_in();
        self.save(&registration, "checked_in").await?;
        Ok(registration)
    }

    /// Cancel and clear attendance, whatever the prior state
    pub async fn cancel(&self, id: &str) -> Result<Registration> {
        let mut registration = self.load(id).await?;
        registration.cancel();
        self.save(&registration, "cancelled").await?;
        Ok(registration)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Registration>> {
        let id = require_id(id, "Registration ID")?;
        with_timeout(self.timeout, "get registration", self.registrations.find_by_id(id)).await
    }

    pub async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>> {
        let event_id = require_id(event_id, "Event ID")?;
        debug!(event_id = %event_id, "Listing registrations by event");
        with_timeout(
            self.timeout,
            "list registrations by event",
            self.registrations.find_by_event(event_id),
        )
        .await
    }

    pub async fn list_by_guest(&self, guest_id: &str) -> Result<Vec<Registration>> {
        let guest_id = require_id(guest_id, "Guest ID")?;
        debug!(guest_id = %guest_id, "Listing registrations by guest");
        with_timeout(
            self.timeout,
            "list registrations by guest",
            self.registrations.find_by_guest(guest_id),
        )
        .await
    }

    async fn load(&self, id: &str) -> Result<Registration> {
        let id = require_id(id, "Registration ID")?;
        with_timeout(self.timeout, "get registration", self.registrations.find_by_id(id))
            .await?
            .ok_or_else(|| EventManagerError::not_found("Registration", id))
    }

    async fn save(&self, registration: &Registration, action: &str) -> Result<()> {
        with_timeout(
            self.timeout,
            "update registration",
            self.registrations.update(registration),
        )
        .await?;
        log_registration_action(&registration.id, action, &registration.status, registration.checked_in);
        Ok(())
    }
}
