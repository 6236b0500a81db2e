//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{EventManagerError, Result};

/// Label of the unfiltered status sentinel
pub const ALL_STATUSES: &str = "Tất cả";

/// Lifecycle status, always derived from the event's time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[serde(rename = "Sắp diễn ra", alias = "upcoming")]
    Upcoming,
    #[serde(rename = "Đang diễn ra", alias = "ongoing")]
    Ongoing,
    #[serde(rename = "Đã kết thúc", alias = "ended")]
    Ended,
}

impl EventStatus {
    pub const ALL: [EventStatus; 3] = [EventStatus::Upcoming, EventStatus::Ongoing, EventStatus::Ended];

    /// Status of a `[start, end]` window as seen at `now`
    pub fn from_window(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if now < start {
            EventStatus::Upcoming
        } else if now > end {
            EventStatus::Ended
        } else {
            EventStatus::Ongoing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "Sắp diễn ra",
            EventStatus::Ongoing => "Đang diễn ra",
            EventStatus::Ended => "Đã kết thúc",
        }
    }

    /// Parse a stored label or its English alias
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value || status.alias().eq_ignore_ascii_case(value))
    }

    fn alias(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status filter used when listing events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(EventStatus),
}

impl StatusFilter {
    /// Blank input and the "All" sentinel mean unfiltered
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let value = match value.map(str::trim) {
            None | Some("") => return Ok(StatusFilter::All),
            Some(v) => v,
        };
        if value == ALL_STATUSES || value.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        EventStatus::parse(value)
            .map(StatusFilter::Only)
            .ok_or_else(|| EventManagerError::validation(format!("Unknown event status: {}", value)))
    }

    pub fn matches(&self, status: EventStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Kind of event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Sự kiện mở", alias = "open")]
    Open,
    #[serde(rename = "Sự kiện giới hạn", alias = "limited")]
    Limited,
    #[serde(rename = "Sự kiện riêng tư", alias = "private")]
    Private,
}

impl EventType {
    /// Minimum capacity of a capacity-limited event
    pub const MIN_LIMITED_GUESTS: u32 = 2;

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Open => "Sự kiện mở",
            EventType::Limited => "Sự kiện giới hạn",
            EventType::Private => "Sự kiện riêng tư",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [EventType::Open, EventType::Limited, EventType::Private]
            .into_iter()
            .find(|kind| kind.label() == value || kind.alias().eq_ignore_ascii_case(value))
    }

    fn alias(&self) -> &'static str {
        match self {
            EventType::Open => "open",
            EventType::Limited => "limited",
            EventType::Private => "private",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    pub location: String,
    /// 0 means unlimited
    pub max_guests: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        EventStatus::from_window(now, self.start_date, self.end_date)
    }

    /// Recompute the derived status; returns true when it changed
    pub fn refresh_status(&mut self, now: DateTime<Utc>) -> bool {
        let status = self.status_at(now);
        let changed = status != self.status;
        self.status = status;
        changed
    }
}

/// Capacity-limited events need room for at least two guests
pub fn validate_capacity(event_type: EventType, max_guests: u32) -> Result<()> {
    if event_type == EventType::Limited && max_guests < EventType::MIN_LIMITED_GUESTS {
        return Err(EventManagerError::validation(format!(
            "Capacity-limited events must allow at least {} guests",
            EventType::MIN_LIMITED_GUESTS
        )));
    }
    Ok(())
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        return Err(EventManagerError::validation("Event end must not precede its start"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub location: String,
    #[serde(default)]
    pub max_guests: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EventManagerError::validation("Event name is required"));
        }
        validate_window(self.start_date, self.end_date)?;
        validate_capacity(self.event_type, self.max_guests)
    }
}

/// Partial update; unset fields keep the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    pub max_guests: Option<u32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image_urls: Option<Vec<String>>,
}

impl UpdateEventRequest {
    /// Merge onto the prior record and validate the result
    pub fn apply_to(self, prior: &Event) -> Result<Event> {
        let mut event = prior.clone();
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(event_type) = self.event_type {
            event.event_type = event_type;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(max_guests) = self.max_guests {
            event.max_guests = max_guests;
        }
        if let Some(start) = self.start_date {
            event.start_date = start;
        }
        if let Some(end) = self.end_date {
            event.end_date = end;
        }
        if let Some(urls) = self.image_urls {
            event.image_urls = urls;
        }

        if event.name.trim().is_empty() {
            return Err(EventManagerError::validation("Event name is required"));
        }
        validate_window(event.start_date, event.end_date)?;
        validate_capacity(event.event_type, event.max_guests)?;
        Ok(event)
    }
}

/// Listing filter; `None` bounds are open
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EventFilter {
    /// The event's window must lie fully inside the given bounds
    pub fn window_matches(&self, event: &Event) -> bool {
        if let Some(from) = self.from {
            if event.start_date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if event.end_date > to {
                return false;
            }
        }
        true
    }
}
