//! Event service implementation
//!
//! Owns the event lifecycle: status is derived from the time window on every
//! write and read, and `auto_update_status` reconciles what storage holds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::database::repositories::{EventRepository, RegistrationRepository};
use crate::models::event::{
    CreateEventRequest, Event, EventFilter, EventStatus, StatusFilter, UpdateEventRequest,
};
use crate::models::EventStat;
use crate::services::storage::ObjectStorage;
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::{ensure_id, require_id, with_timeout};
use crate::utils::logging::{log_event_action, log_status_reconciliation};

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    object_storage: Arc<dyn ObjectStorage>,
    timeout: Duration,
    max_list_results: usize,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        object_storage: Arc<dyn ObjectStorage>,
        timeout: Duration,
        max_list_results: usize,
    ) -> Self {
        Self {
            events,
            registrations,
            object_storage,
            timeout,
            max_list_results,
        }
    }

    /// Create a new event with a freshly derived status
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        request.validate()?;

        let now = Utc::now();
        let event = Event {
            id: ensure_id(request.id),
            name: request.name.trim().to_string(),
            description: request.description,
            event_type: request.event_type,
            status: EventStatus::from_window(now, request.start_date, request.end_date),
            location: request.location.trim().to_string(),
            max_guests: request.max_guests,
            start_date: request.start_date,
            end_date: request.end_date,
            image_urls: request.image_urls,
            created_at: now,
            updated_at: now,
        };

        with_timeout(self.timeout, "create event", self.events.insert(&event)).await?;

        log_event_action(&event.id, "created", Some(event.status.label()));
        Ok(event)
    }

    /// Merge changes onto the stored event.
    ///
    /// Unset fields keep their stored values, so omitting the window never
    /// resets the status.
    pub async fn update(&self, id: &str, request: UpdateEventRequest) -> Result<Event> {
        let id = require_id(id, "Event ID")?;
        debug!(event_id = %id, "Updating event");

        let prior = self.load(id, "update event").await?;
        let now = Utc::now();
        let mut event = request.apply_to(&prior)?;
        event.refresh_status(now);
        event.updated_at = now;

        with_timeout(self.timeout, "update event", self.events.update(&event)).await?;

        log_event_action(&event.id, "updated", Some(event.status.label()));
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id, "Event ID")?;
        let removed = with_timeout(self.timeout, "delete event", self.events.delete(id)).await?;
        if !removed {
            return Err(EventManagerError::not_found("Event", id));
        }

        log_event_action(id, "deleted", None);
        Ok(())
    }

    /// Event with its status recomputed, or `None` when absent
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Event>> {
        let id = require_id(id, "Event ID")?;
        let event = with_timeout(self.timeout, "get event", self.events.find_by_id(id)).await?;

        Ok(event.map(|mut event| {
            event.refresh_status(Utc::now());
            event
        }))
    }

    /// Events matching the status filter whose window lies inside the bounds
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let status = StatusFilter::parse(filter.status.as_deref())?;
        debug!(status = ?filter.status, from = ?filter.from, to = ?filter.to, "Listing events");

        let now = Utc::now();
        let mut events = with_timeout(self.timeout, "list events", self.events.find_all()).await?;
        for event in events.iter_mut() {
            event.refresh_status(now);
        }
        events.retain(|event| status.matches(event.status) && filter.window_matches(event));

        if self.max_list_results > 0 && events.len() > self.max_list_results {
            warn!(
                total = events.len(),
                limit = self.max_list_results,
                "Event listing truncated"
            );
            events.truncate(self.max_list_results);
        }
        Ok(events)
    }

    /// Events that have not started yet, earliest first
    pub async fn upcoming(&self) -> Result<Vec<Event>> {
        let now = Utc::now();
        let mut events =
            with_timeout(self.timeout, "list upcoming events", self.events.find_upcoming(now))
                .await?;
        for event in events.iter_mut() {
            event.refresh_status(now);
        }
        Ok(events)
    }

    /// Persist a recomputed status for every event whose stored status drifted.
    ///
    /// Returns the number of events written. Unreadable stored labels are
    /// rewritten first. Each later write is conditional on the stored status
    /// being unchanged since the scan, so a concurrent edit is not overwritten.
    /// A failure mid-scan leaves earlier writes in place.
    pub async fn auto_update_status(&self) -> Result<usize> {
        let started = Instant::now();
        let now = Utc::now();
        let mut changed = with_timeout(
            self.timeout,
            "repair event status labels",
            self.events.repair_status_labels(now),
        )
        .await?;
        let events = with_timeout(self.timeout, "scan events", self.events.find_all()).await?;

        for event in &events {
            let derived = event.status_at(now);
            if derived == event.status {
                continue;
            }
            let written = with_timeout(
                self.timeout,
                "update event status",
                self.events.update_status(&event.id, event.status, derived, now),
            )
            .await?;

            if written {
                changed += 1;
                debug!(event_id = %event.id, from = %event.status, to = %derived, "Event status reconciled");
            } else {
                debug!(event_id = %event.id, "Event changed concurrently, status write skipped");
            }
        }

        log_status_reconciliation(events.len(), changed, started.elapsed().as_millis() as u64);
        Ok(changed)
    }

    /// Attendance counts computed from the event's registrations
    pub async fn compute_statistics(&self, event_id: &str) -> Result<EventStat> {
        let event_id = require_id(event_id, "Event ID")?;
        let registrations = with_timeout(
            self.timeout,
            "load event registrations",
            self.registrations.find_by_event(event_id),
        )
        .await?;

        let total = registrations.len() as i64;
        let checked_in = registrations.iter().filter(|r| r.checked_in).count() as i64;
        Ok(EventStat::new(event_id, total, checked_in))
    }

    /// Upload an image and append its URL to the event
    pub async fn attach_image(
        &self,
        event_id: &str,
        file_name: &str,
        content: &[u8],
        content_type: &str,
    ) -> Result<Event> {
        let event_id = require_id(event_id, "Event ID")?;
        let mut event = self.load(event_id, "attach event image").await?;

        let url = with_timeout(
            self.timeout,
            "upload event image",
            self.object_storage
                .upload(file_name, content, content.len() as u64, content_type),
        )
        .await?;

        let now = Utc::now();
        event.image_urls.push(url.clone());
        event.refresh_status(now);
        event.updated_at = now;
        with_timeout(self.timeout, "update event", self.events.update(&event)).await?;

        info!(event_id = %event.id, url = %url, "Image attached to event");
        Ok(event)
    }

    async fn load(&self, id: &str, operation: &str) -> Result<Event> {
        with_timeout(self.timeout, operation, self.events.find_by_id(id))
            .await?
            .ok_or_else(|| EventManagerError::not_found("Event", id))
    }
}
