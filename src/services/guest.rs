//! Guest service implementation
//!
//! Coordinates guests with their registration. A guest created for an event is
//! linked through `ensure_guest_registration`; when that link cannot be made the
//! freshly inserted guest is removed again so no unlinked guest is left behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::database::repositories::{GuestRepository, RegistrationRepository};
use crate::models::guest::{normalize_contact, CreateGuestRequest, Guest, UpdateGuestRequest};
use crate::models::registration::{status, Registration};
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::{ensure_id, generate_id, matches_keyword, non_blank, require_id, with_timeout};
use crate::utils::locks::KeyedLocks;
use crate::utils::logging::{log_compensation, log_guest_action, log_registration_action};

#[derive(Clone)]
pub struct GuestService {
    guests: Arc<dyn GuestRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    locks: KeyedLocks,
    timeout: Duration,
    max_list_results: usize,
}

impl GuestService {
    pub fn new(
        guests: Arc<dyn GuestRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        timeout: Duration,
        max_list_results: usize,
    ) -> Self {
        Self {
            guests,
            registrations,
            locks: KeyedLocks::new(),
            timeout,
            max_list_results,
        }
    }

    /// Create a guest and link it to `event_id`
    pub async fn create(&self, request: CreateGuestRequest, event_id: &str) -> Result<Guest> {
        let event_id = require_id(event_id, "Event ID")?;
        let guest = Guest {
            id: ensure_id(request.id),
            full_name: request.full_name.trim().to_string(),
            email: normalize_contact(request.email),
            phone: normalize_contact(request.phone),
        };
        guest.validate()?;

        with_timeout(self.timeout, "create guest", self.guests.insert(&guest)).await?;
        log_guest_action(&guest.id, "created", Some(event_id));

        if let Err(link_error) = self.ensure_guest_registration(&guest.id, event_id).await {
            self.compensate_create(&guest.id, &link_error).await;
            return Err(link_error);
        }
        Ok(guest)
    }

    /// Best-effort removal of a guest whose registration could not be linked.
    /// A failed delete is logged and otherwise swallowed.
    async fn compensate_create(&self, guest_id: &str, cause: &EventManagerError) {
        let reason = cause.to_string();
        match with_timeout(self.timeout, "delete guest", self.guests.delete(guest_id)).await {
            Ok(_) => log_compensation("guest", guest_id, &reason, true),
            Err(e) => {
                warn!(guest_id = %guest_id, error = %e, "Compensating guest delete failed");
                log_compensation("guest", guest_id, &reason, false);
            }
        }
    }

    /// Point the guest's registration at `event_id`.
    ///
    /// Creates a pending registration when the guest has none; otherwise the
    /// guest's oldest registration is repointed, whichever event it was for.
    /// Calls for the same guest are serialized.
    pub async fn ensure_guest_registration(&self, guest_id: &str, event_id: &str) -> Result<Registration> {
        let guest_id = require_id(guest_id, "Guest ID")?;
        let event_id = require_id(event_id, "Event ID")?;
        let _guard = self.locks.lock(guest_id).await;

        let existing = with_timeout(
            self.timeout,
            "find guest registrations",
            self.registrations.find_by_guest(guest_id),
        )
        .await?;

        match existing.into_iter().next() {
            Some(mut registration) => {
                if registration.event_id != event_id {
                    debug!(
                        registration_id = %registration.id,
                        from = %registration.event_id,
                        to = %event_id,
                        "Repointing guest registration"
                    );
                }
                registration.event_id = event_id.to_string();
                registration.guest_id = guest_id.to_string();
                with_timeout(
                    self.timeout,
                    "update registration",
                    self.registrations.update(&registration),
                )
                .await?;
                log_registration_action(&registration.id, "relinked", &registration.status, registration.checked_in);
                Ok(registration)
            }
            None => {
                let registration = Registration {
                    id: generate_id(),
                    event_id: event_id.to_string(),
                    guest_id: guest_id.to_string(),
                    status: status::PENDING.to_string(),
                    checked_in: false,
                    created_at: Utc::now(),
                };
                with_timeout(
                    self.timeout,
                    "create registration",
                    self.registrations.insert(&registration),
                )
                .await?;
                log_registration_action(&registration.id, "created", &registration.status, false);
                Ok(registration)
            }
        }
    }

    /// Update an existing guest, relinking when `event_id` is given
    pub async fn update(&self, id: &str, request: UpdateGuestRequest, event_id: Option<&str>) -> Result<Guest> {
        let id = require_id(id, "Guest ID")?;
        let prior = with_timeout(self.timeout, "get guest", self.guests.find_by_id(id))
            .await?
            .ok_or_else(|| EventManagerError::not_found("Guest", id))?;

        let guest = request.apply_to(&prior);
        guest.validate()?;
        with_timeout(self.timeout, "update guest", self.guests.update(&guest)).await?;

        let event_id = event_id.and_then(non_blank);
        if let Some(event_id) = event_id {
            self.ensure_guest_registration(&guest.id, event_id).await?;
        }

        log_guest_action(&guest.id, "updated", event_id);
        Ok(guest)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id, "Guest ID")?;
        let removed = with_timeout(self.timeout, "delete guest", self.guests.delete(id)).await?;
        if !removed {
            return Err(EventManagerError::not_found("Guest", id));
        }

        log_guest_action(id, "deleted", None);
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Guest>> {
        let id = require_id(id, "Guest ID")?;
        with_timeout(self.timeout, "get guest", self.guests.find_by_id(id)).await
    }

    /// All guests, or those whose name, email or phone contains `keyword`
    pub async fn list(&self, keyword: Option<&str>) -> Result<Vec<Guest>> {
        let mut guests = with_timeout(self.timeout, "list guests", self.guests.find_all()).await?;

        if let Some(keyword) = keyword.and_then(non_blank) {
            let keyword = keyword.to_lowercase();
            guests.retain(|guest| matches_keyword(&keyword, &guest.searchable_fields()));
        }

        if self.max_list_results > 0 && guests.len() > self.max_list_results {
            warn!(total = guests.len(), limit = self.max_list_results, "Guest listing truncated");
            guests.truncate(self.max_list_results);
        }
        Ok(guests)
    }

    /// Exact email match first, then a case-insensitive phone scan
    pub async fn find_by_contact(&self, email: Option<&str>, phone: Option<&str>) -> Result<Option<Guest>> {
        if let Some(email) = email.and_then(non_blank) {
            let found = with_timeout(
                self.timeout,
                "find guest by email",
                self.guests.find_by_email(email),
            )
            .await?;
            if found.is_some() {
                return Ok(found);
            }
        }

        let Some(phone) = phone.and_then(non_blank) else {
            return Ok(None);
        };
        let phone = phone.to_lowercase();
        let guests = with_timeout(self.timeout, "scan guests", self.guests.find_all()).await?;
        let found = guests.into_iter().find(|guest| {
            guest
                .phone
                .as_deref()
                .is_some_and(|p| p.to_lowercase() == phone)
        });

        if let Some(guest) = &found {
            info!(guest_id = %guest.id, "Guest matched by phone");
        }
        Ok(found)
    }
}
