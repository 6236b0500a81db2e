//! Analytics service implementation
//!
//! Thin layer over the aggregate gateway. Every figure is computed live from
//! registrations; nothing here is cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database::repositories::AggregateRepository;
use crate::models::analytics::{
    AnalyticsOverview, EventGuestStat, EventStat, EventTypeGuestStat, Granularity,
    LocationGuestStat, ParticipationTrendPoint,
};
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::{require_id, with_timeout};

#[derive(Clone)]
pub struct AnalyticsService {
    aggregates: Arc<dyn AggregateRepository>,
    timeout: Duration,
}

impl AnalyticsService {
    pub fn new(aggregates: Arc<dyn AggregateRepository>, timeout: Duration) -> Self {
        Self {
            aggregates,
            timeout,
        }
    }

    /// Guest counts per event, largest first
    pub async fn guest_stats_by_event(&self) -> Result<Vec<EventGuestStat>> {
        with_timeout(
            self.timeout,
            "aggregate guest stats by event",
            self.aggregates.guest_count_by_event(None),
        )
        .await
    }

    pub async fn guest_stats_by_event_type(&self) -> Result<Vec<EventTypeGuestStat>> {
        with_timeout(
            self.timeout,
            "aggregate guest stats by event type",
            self.aggregates.guest_count_by_event_type(),
        )
        .await
    }

    pub async fn guest_stats_by_location(&self) -> Result<Vec<LocationGuestStat>> {
        with_timeout(
            self.timeout,
            "aggregate guest stats by location",
            self.aggregates.guest_count_by_location(),
        )
        .await
    }

    /// Registrations bucketed by `granularity`; unknown units fall back to days
    pub async fn participation_trend(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        granularity: &str,
    ) -> Result<Vec<ParticipationTrendPoint>> {
        let granularity = Granularity::parse(granularity);
        debug!(from = ?from, to = ?to, granularity = granularity.as_str(), "Computing participation trend");

        with_timeout(
            self.timeout,
            "aggregate participation trend",
            self.aggregates.participation_trend(from, to, granularity),
        )
        .await
    }

    /// The `limit` events with the most guests; 0 returns every event
    pub async fn top_events_by_guest_count(&self, limit: i64) -> Result<Vec<EventGuestStat>> {
        if limit < 0 {
            return Err(EventManagerError::validation("limit must be non-negative"));
        }
        let limit = (limit > 0).then(|| usize::try_from(limit).unwrap_or(usize::MAX));

        with_timeout(
            self.timeout,
            "aggregate top events",
            self.aggregates.guest_count_by_event(limit),
        )
        .await
    }

    /// Totals for one event; zero-valued when it has no registrations
    pub async fn event_stats(&self, event_id: &str) -> Result<EventStat> {
        let event_id = require_id(event_id, "Event ID")?;
        with_timeout(
            self.timeout,
            "aggregate event stats",
            self.aggregates.guest_stats_by_event(event_id),
        )
        .await
    }

    pub async fn count_guests_by_event(&self, event_id: &str) -> Result<i64> {
        let event_id = require_id(event_id, "Event ID")?;
        with_timeout(
            self.timeout,
            "count guests by event",
            self.aggregates.count_by_event(event_id),
        )
        .await
    }

    /// By-event, by-type and by-location breakdowns, fetched concurrently
    pub async fn overview(&self) -> Result<AnalyticsOverview> {
        let (by_event, by_event_type, by_location) = futures::try_join!(
            self.guest_stats_by_event(),
            self.guest_stats_by_event_type(),
            self.guest_stats_by_location(),
        )?;

        Ok(AnalyticsOverview {
            by_event,
            by_event_type,
            by_location,
        })
    }
}
