//! Event repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::warn;

use super::{insert_error, EventRepository};
use crate::models::event::{Event, EventStatus, EventType};
use crate::utils::errors::{EventManagerError, Result};

const EVENT_COLUMNS: &str = "id, name, description, event_type, status, location, max_guests, start_date, end_date, image_urls, created_at, updated_at";

/// Storage shape of an event row
#[derive(Debug, Clone, FromRow)]
pub struct EventRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub event_type: String,
    pub status: String,
    pub location: String,
    pub max_guests: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRecord> for Event {
    type Error = EventManagerError;

    fn try_from(record: EventRecord) -> Result<Self> {
        let event_type = EventType::parse(&record.event_type).ok_or_else(|| {
            EventManagerError::validation(format!(
                "Stored event {} has unknown type {}",
                record.id, record.event_type
            ))
        })?;
        let status = EventStatus::parse(&record.status).unwrap_or_else(|| {
            EventStatus::from_window(Utc::now(), record.start_date, record.end_date)
        });

        Ok(Event {
            id: record.id,
            name: record.name,
            description: record.description,
            event_type,
            status,
            location: record.location,
            max_guests: u32::try_from(record.max_guests).unwrap_or(0),
            start_date: record.start_date,
            end_date: record.end_date,
            image_urls: record.image_urls,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn to_events(records: Vec<EventRecord>) -> Result<Vec<Event>> {
    records.into_iter().map(Event::try_from).collect()
}

fn max_guests_column(max_guests: u32) -> Result<i32> {
    i32::try_from(max_guests)
        .map_err(|_| EventManagerError::validation(format!("max_guests {} is out of range", max_guests)))
}

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, name, description, event_type, status, location, max_guests, start_date, end_date, image_urls, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#
        )
        .bind(&event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.event_type.label())
        .bind(event.status.label())
        .bind(&event.location)
        .bind(max_guests_column(event.max_guests)?)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.image_urls)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, || format!("event {} already exists", event.id)))?;

        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2,
                description = $3,
                event_type = $4,
                status = $5,
                location = $6,
                max_guests = $7,
                start_date = $8,
                end_date = $9,
                image_urls = $10,
                updated_at = $11
            WHERE id = $1
            "#
        )
        .bind(&event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.event_type.label())
        .bind(event.status.label())
        .bind(&event.location)
        .bind(max_guests_column(event.max_guests)?)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.image_urls)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EventManagerError::not_found("Event", event.id.clone()));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        expected: EventStatus,
        status: EventStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE events SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2"
        )
        .bind(id)
        .bind(expected.label())
        .bind(status.label())
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn repair_status_labels(&self, now: DateTime<Utc>) -> Result<usize> {
        let labels: Vec<&str> = EventStatus::ALL.iter().map(EventStatus::label).collect();
        let result = sqlx::query(
            r#"
            UPDATE events
            SET status = CASE
                    WHEN $1 < start_date THEN $2
                    WHEN $1 > end_date THEN $4
                    ELSE $3
                END,
                updated_at = $1
            WHERE NOT (status = ANY($5))
            "#
        )
        .bind(now)
        .bind(EventStatus::Upcoming.label())
        .bind(EventStatus::Ongoing.label())
        .bind(EventStatus::Ended.label())
        .bind(&labels)
        .execute(&self.pool)
        .await?;

        let repaired = result.rows_affected() as usize;
        if repaired > 0 {
            warn!(repaired, "Rewrote unreadable event status labels");
        }
        Ok(repaired)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        let record = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Event::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {} FROM events ORDER BY start_date ASC, id ASC",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        to_events(records)
    }

    async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let records = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {} FROM events WHERE start_date >= $1 ORDER BY start_date ASC, id ASC",
            EVENT_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        to_events(records)
    }
}
