//! Aggregate repository implementation
//!
//! Grouping, counting and the event join all run inside PostgreSQL so that
//! registration volume never has to cross the wire.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::AggregateRepository;
use crate::models::analytics::{
    EventGuestStat, EventStat, EventTypeGuestStat, Granularity, LocationGuestStat,
    ParticipationTrendPoint, UNKNOWN_GROUP,
};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct PgAggregateRepository {
    pool: PgPool,
}

impl PgAggregateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AggregateRepository for PgAggregateRepository {
    async fn guest_count_by_event(&self, limit: Option<usize>) -> Result<Vec<EventGuestStat>> {
        // LIMIT NULL means no limit
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let stats = sqlx::query_as::<_, EventGuestStat>(
            r#"
            SELECT r.event_id,
                   e.name AS event_name,
                   e.location,
                   COUNT(*) AS total_guests,
                   COUNT(*) FILTER (WHERE r.checked_in) AS checked_in
            FROM registrations r
            LEFT JOIN events e ON e.id = r.event_id
            GROUP BY r.event_id, e.name, e.location
            ORDER BY total_guests DESC, r.event_id ASC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn guest_count_by_event_type(&self) -> Result<Vec<EventTypeGuestStat>> {
        let stats = sqlx::query_as::<_, EventTypeGuestStat>(
            r#"
            SELECT COALESCE(e.event_type, $1) AS event_type,
                   COUNT(*) AS total_guests,
                   COUNT(*) FILTER (WHERE r.checked_in) AS checked_in
            FROM registrations r
            LEFT JOIN events e ON e.id = r.event_id
            GROUP BY 1
            ORDER BY total_guests DESC, event_type ASC
            "#
        )
        .bind(UNKNOWN_GROUP)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn guest_count_by_location(&self) -> Result<Vec<LocationGuestStat>> {
        let stats = sqlx::query_as::<_, LocationGuestStat>(
            r#"
            SELECT COALESCE(e.location, $1) AS location,
                   COUNT(*) AS total_guests,
                   COUNT(*) FILTER (WHERE r.checked_in) AS checked_in
            FROM registrations r
            LEFT JOIN events e ON e.id = r.event_id
            GROUP BY 1
            ORDER BY total_guests DESC, location ASC
            "#
        )
        .bind(UNKNOWN_GROUP)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn participation_trend(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        granularity: Granularity,
    ) -> Result<Vec<ParticipationTrendPoint>> {
        let points = sqlx::query_as::<_, ParticipationTrendPoint>(
            r#"
            SELECT date_trunc($1, r.created_at, 'UTC') AS period,
                   COUNT(*) AS total_guests,
                   COUNT(*) FILTER (WHERE r.checked_in) AS checked_in
            FROM registrations r
            WHERE ($2::timestamptz IS NULL OR r.created_at >= $2)
              AND ($3::timestamptz IS NULL OR r.created_at <= $3)
            GROUP BY 1
            ORDER BY period ASC
            "#
        )
        .bind(granularity.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }

    async fn guest_stats_by_event(&self, event_id: &str) -> Result<EventStat> {
        let (total, checked_in): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total_guests,
                   COUNT(*) FILTER (WHERE checked_in) AS checked_in
            FROM registrations
            WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EventStat::new(event_id, total, checked_in))
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
