//! Database repositories module
//!
//! Each gateway wraps one logical collection. The traits are the contract the
//! services depend on; the `Pg*` types implement them over PostgreSQL and
//! [`crate::database::MemoryStore`] implements them in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    Event, EventGuestStat, EventStat, EventStatus, EventTypeGuestStat, Granularity, Guest,
    LocationGuestStat, ParticipationTrendPoint, Registration, User,
};
use crate::utils::errors::{EventManagerError, Result};

pub mod aggregate;
pub mod event;
pub mod guest;
pub mod registration;
pub mod user;

/// Report a unique-key violation on insert as `Conflict`, like the in-process store
fn insert_error(error: sqlx::Error, conflict: impl FnOnce() -> String) -> EventManagerError {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => EventManagerError::Conflict(conflict()),
        other => EventManagerError::Database(other),
    }
}

// Re-export repositories
pub use aggregate::PgAggregateRepository;
pub use event::PgEventRepository;
pub use guest::PgGuestRepository;
pub use registration::PgRegistrationRepository;
pub use user::PgUserRepository;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<()>;

    /// Fails with `NotFound` when no record has the event's ID
    async fn update(&self, event: &Event) -> Result<()>;

    /// Write `status` only if the stored status is still `expected`.
    /// Returns whether the write happened.
    async fn update_status(
        &self,
        id: &str,
        expected: EventStatus,
        status: EventStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Rewrite stored statuses that are not one of the canonical labels with
    /// the status derived at `now`. Returns the number of records rewritten.
    async fn repair_status_labels(&self, _now: DateTime<Utc>) -> Result<usize> {
        Ok(0)
    }

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>>;

    async fn find_all(&self) -> Result<Vec<Event>>;

    /// Events starting at or after `now`, earliest first
    async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn insert(&self, guest: &Guest) -> Result<()>;

    /// Fails with `NotFound` when no record has the guest's ID
    async fn update(&self, guest: &Guest) -> Result<()>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>>;

    /// Exact email match
    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>>;

    async fn find_all(&self) -> Result<Vec<Guest>>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn insert(&self, registration: &Registration) -> Result<()>;

    /// Fails with `NotFound` when no record has the registration's ID
    async fn update(&self, registration: &Registration) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>>;

    /// Oldest first
    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Registration>>;

    /// Oldest first, across all events
    async fn find_by_guest(&self, guest_id: &str) -> Result<Vec<Registration>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;

    /// Fails with `NotFound` when no record has the user's ID
    async fn update(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>>;
}

/// Grouped queries over the registration collection, joined against events
#[async_trait]
pub trait AggregateRepository: Send + Sync {
    /// Sorted by total guests descending; `limit` of `None` is unlimited
    async fn guest_count_by_event(&self, limit: Option<usize>) -> Result<Vec<EventGuestStat>>;

    async fn guest_count_by_event_type(&self) -> Result<Vec<EventTypeGuestStat>>;

    async fn guest_count_by_location(&self) -> Result<Vec<LocationGuestStat>>;

    /// Bounds are inclusive; sorted by period ascending
    async fn participation_trend(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        granularity: Granularity,
    ) -> Result<Vec<ParticipationTrendPoint>>;

    /// Zero-valued when the event has no registrations
    async fn guest_stats_by_event(&self, event_id: &str) -> Result<EventStat>;

    async fn count_by_event(&self, event_id: &str) -> Result<i64>;
}
