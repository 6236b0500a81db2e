//! Aggregation result models
//!
//! These are computed live from registration records and never persisted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Group key used for registrations whose event cannot be joined
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Guest counts for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventGuestStat {
    pub event_id: String,
    pub event_name: Option<String>,
    pub location: Option<String>,
    pub total_guests: i64,
    pub checked_in: i64,
}

/// Guest counts per event type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventTypeGuestStat {
    pub event_type: String,
    pub total_guests: i64,
    pub checked_in: i64,
}

/// Guest counts per event location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LocationGuestStat {
    pub location: String,
    pub total_guests: i64,
    pub checked_in: i64,
}

/// Guest counts for one time bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ParticipationTrendPoint {
    pub period: DateTime<Utc>,
    pub total_guests: i64,
    pub checked_in: i64,
}

/// Attendance for a single event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventStat {
    pub event_id: String,
    pub total_guests: i64,
    pub checked_in: i64,
    pub absent: i64,
}

impl EventStat {
    pub fn new(event_id: impl Into<String>, total_guests: i64, checked_in: i64) -> Self {
        Self {
            event_id: event_id.into(),
            total_guests,
            checked_in,
            absent: total_guests - checked_in,
        }
    }

    pub fn empty(event_id: impl Into<String>) -> Self {
        Self::new(event_id, 0, 0)
    }
}

/// Dashboard view combining the grouped aggregations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub by_event: Vec<EventGuestStat>,
    pub by_event_type: Vec<EventTypeGuestStat>,
    pub by_location: Vec<LocationGuestStat>,
}

/// Time bucket unit for participation trends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Case-insensitive; unrecognized values fall back to `Day`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "hour" | "hours" => Granularity::Hour,
            "week" | "weeks" => Granularity::Week,
            "month" | "months" => Granularity::Month,
            _ => Granularity::Day,
        }
    }

    /// Unit name understood by `date_trunc`
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Start of the bucket containing `ts` (weeks start on Monday, UTC)
    pub fn truncate(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        let naive = match self {
            Granularity::Hour => date
                .and_hms_opt(ts.hour(), 0, 0)
                .unwrap_or_else(|| ts.naive_utc()),
            Granularity::Day => date.and_time(NaiveTime::default()),
            Granularity::Week => {
                let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                monday.and_time(NaiveTime::default())
            }
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .unwrap_or(date)
                .and_time(NaiveTime::default()),
        };
        Utc.from_utc_datetime(&naive)
    }
}
