//! In-process storage backend
//!
//! `MemoryStore` implements every gateway trait over shared maps. It is a
//! selectable backend (`database.backend = "memory"`) and the store used by
//! the service tests, with switchable failure injection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::repositories::{
    AggregateRepository, EventRepository, GuestRepository, RegistrationRepository, UserRepository,
};
use crate::models::analytics::{
    EventGuestStat, EventStat, EventTypeGuestStat, Granularity, LocationGuestStat,
    ParticipationTrendPoint, UNKNOWN_GROUP,
};
use crate::models::{Event, EventStatus, Guest, Registration, User};
use crate::utils::errors::{EventManagerError, Result};

#[derive(Default)]
struct Collections {
    events: HashMap<String, Event>,
    guests: HashMap<String, Guest>,
    registrations: HashMap<String, Registration>,
    users: HashMap<String, User>,
}

/// Switchable failures, for exercising partial-failure paths
#[derive(Debug, Default, Clone)]
struct Faults {
    registration_writes: bool,
    guest_deletes: bool,
    aggregates: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
    faults: Arc<RwLock<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make registration inserts and updates fail
    pub async fn set_fail_on_registration_write(&self, fail: bool) {
        self.faults.write().await.registration_writes = fail;
    }

    /// Make guest deletes fail
    pub async fn set_fail_on_guest_delete(&self, fail: bool) {
        self.faults.write().await.guest_deletes = fail;
    }

    /// Make aggregation queries fail
    pub async fn set_fail_on_aggregate(&self, fail: bool) {
        self.faults.write().await.aggregates = fail;
    }

    pub async fn registration_count(&self) -> usize {
        self.data.read().await.registrations.len()
    }

    pub async fn guest_count(&self) -> usize {
        self.data.read().await.guests.len()
    }

    async fn check(&self, tripped: impl Fn(&Faults) -> bool, what: &str) -> Result<()> {
        if tripped(&*self.faults.read().await) {
            return Err(EventManagerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected {} failure", what),
            )));
        }
        Ok(())
    }
}

fn sorted_registrations<'a>(regs: impl Iterator<Item = &'a Registration>) -> Vec<Registration> {
    let mut regs: Vec<Registration> = regs.cloned().collect();
    regs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    regs
}

/// (total, checked_in) tallies keyed by group
fn tally<'a, K, F>(regs: impl Iterator<Item = &'a Registration>, key: F) -> HashMap<K, (i64, i64)>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Registration) -> K,
{
    let mut groups: HashMap<K, (i64, i64)> = HashMap::new();
    for reg in regs {
        let entry = groups.entry(key(reg)).or_default();
        entry.0 += 1;
        if reg.checked_in {
            entry.1 += 1;
        }
    }
    groups
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert(&self, event: &Event) -> Result<()> {
        let mut data = self.data.write().await;
        if data.events.contains_key(&event.id) {
            return Err(EventManagerError::Conflict(format!("event {} already exists", event.id)));
        }
        data.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<()> {
        let mut data = self.data.write().await;
        match data.events.get_mut(&event.id) {
            Some(stored) => {
                let created_at = stored.created_at;
                *stored = event.clone();
                stored.created_at = created_at;
                Ok(())
            }
            None => Err(EventManagerError::not_found("Event", event.id.clone())),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        expected: EventStatus,
        status: EventStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut data = self.data.write().await;
        match data.events.get_mut(id) {
            Some(stored) if stored.status == expected => {
                stored.status = status;
                stored.updated_at = updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.data.write().await.events.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.data.read().await.events.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let data = self.data.read().await;
        let mut events: Vec<Event> = data.events.values().cloned().collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events = EventRepository::find_all(self).await?;
        events.retain(|e| e.start_date >= now);
        Ok(events)
    }
}

#[async_trait]
impl GuestRepository for MemoryStore {
    async fn insert(&self, guest: &Guest) -> Result<()> {
        let mut data = self.data.write().await;
        if data.guests.contains_key(&guest.id) {
            return Err(EventManagerError::Conflict(format!("guest {} already exists", guest.id)));
        }
        data.guests.insert(guest.id.clone(), guest.clone());
        Ok(())
    }

    async fn update(&self, guest: &Guest) -> Result<()> {
        let mut data = self.data.write().await;
        match data.guests.get_mut(&guest.id) {
            Some(stored) => {
                *stored = guest.clone();
                Ok(())
            }
            None => Err(EventManagerError::not_found("Guest", guest.id.clone())),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.check(|f| f.guest_deletes, "guest delete").await?;
        Ok(self.data.write().await.guests.remove(id).is_some())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>> {
        Ok(self.data.read().await.guests.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>> {
        let data = self.data.read().await;
        Ok(data
            .guests
            .values()
            .filter(|g| g.email.as_deref() == Some(email))
            .min_by(|a, b| a.id.cmp(&b.id))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Guest>> {
        let data = self.data.read().await;
        let mut guests: Vec<Guest> = data.guests.values().cloned().collect();
        guests.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));
        Ok(guests)
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn insert(&self, registration: &Registration) -> Result<()> {
        self.check(|f| f.registration_writes, "registration write").await?;
        let mut data = self.data.write().await;
        if data.registrations.contains_key(&registration.id) {
            return Err(EventManagerError::Conflict(format!(
                "registration {} already exists",
                registration.id
            )));
        }
        data.registrations.insert(registration.id.clone(), registration.clone());
        Ok(())
    }

    async fn update(&self, registration: &Registration) -> Result<()> {
        self.check(|f| f.registration_writes, "registration write").await?;
        let mut data = self.data.write().await;
        match data.registrations.get_mut(&registration.id) {
            Some(stored) => {
                let created_at = stored.created_at;
                *stored = registration.clone();
                stored.created_at = created_at;
                Ok(())
            }
            None => Err(EventManagerError::not_found("Registration", registration.id.clone())),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>> {
        Ok(self.data.read().await.registrations.get(id).cloned())
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Registration>> {
        let data = self.data.read().await;
        Ok(sorted_registrations(
            data.registrations.values().filter(|r| r.event_id == event_id),
        ))
    }

    async fn find_by_guest(&self, guest_id: &str) -> Result<Vec<Registration>> {
        let data = self.data.read().await;
        Ok(sorted_registrations(
            data.registrations.values().filter(|r| r.guest_id == guest_id),
        ))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut data = self.data.write().await;
        if data.users.values().any(|u| u.username == user.username) {
            return Err(EventManagerError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        data.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut data = self.data.write().await;
        match data.users.get_mut(&user.id) {
            Some(stored) => {
                let (username, created_at) = (stored.username.clone(), stored.created_at);
                *stored = user.clone();
                stored.username = username;
                stored.created_at = created_at;
                Ok(())
            }
            None => Err(EventManagerError::not_found("User", user.id.clone())),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.data.read().await.users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let data = self.data.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }
}

#[async_trait]
impl AggregateRepository for MemoryStore {
    async fn guest_count_by_event(&self, limit: Option<usize>) -> Result<Vec<EventGuestStat>> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let groups = tally(data.registrations.values(), |r| r.event_id.clone());

        let mut stats: Vec<EventGuestStat> = groups
            .into_iter()
            .map(|(event_id, (total_guests, checked_in))| {
                let event = data.events.get(&event_id);
                EventGuestStat {
                    event_name: event.map(|e| e.name.clone()),
                    location: event.map(|e| e.location.clone()),
                    event_id,
                    total_guests,
                    checked_in,
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            b.total_guests
                .cmp(&a.total_guests)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        if let Some(limit) = limit {
            stats.truncate(limit);
        }
        Ok(stats)
    }

    async fn guest_count_by_event_type(&self) -> Result<Vec<EventTypeGuestStat>> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let groups = tally(data.registrations.values(), |r| {
            data.events
                .get(&r.event_id)
                .map(|e| e.event_type.label().to_string())
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
        });

        let mut stats: Vec<EventTypeGuestStat> = groups
            .into_iter()
            .map(|(event_type, (total_guests, checked_in))| EventTypeGuestStat {
                event_type,
                total_guests,
                checked_in,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.total_guests
                .cmp(&a.total_guests)
                .then_with(|| a.event_type.cmp(&b.event_type))
        });
        Ok(stats)
    }

    async fn guest_count_by_location(&self) -> Result<Vec<LocationGuestStat>> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let groups = tally(data.registrations.values(), |r| {
            data.events
                .get(&r.event_id)
                .map(|e| e.location.clone())
                .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
        });

        let mut stats: Vec<LocationGuestStat> = groups
            .into_iter()
            .map(|(location, (total_guests, checked_in))| LocationGuestStat {
                location,
                total_guests,
                checked_in,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.total_guests
                .cmp(&a.total_guests)
                .then_with(|| a.location.cmp(&b.location))
        });
        Ok(stats)
    }

    async fn participation_trend(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        granularity: Granularity,
    ) -> Result<Vec<ParticipationTrendPoint>> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let in_window = data.registrations.values().filter(|r| {
            from.map_or(true, |from| r.created_at >= from) && to.map_or(true, |to| r.created_at <= to)
        });
        let groups = tally(in_window, |r| granularity.truncate(r.created_at));

        let mut points: Vec<ParticipationTrendPoint> = groups
            .into_iter()
            .map(|(period, (total_guests, checked_in))| ParticipationTrendPoint {
                period,
                total_guests,
                checked_in,
            })
            .collect();
        points.sort_by(|a, b| a.period.cmp(&b.period));
        Ok(points)
    }

    async fn guest_stats_by_event(&self, event_id: &str) -> Result<EventStat> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let groups = tally(
            data.registrations.values().filter(|r| r.event_id == event_id),
            |r| r.event_id.clone(),
        );
        Ok(groups
            .get(event_id)
            .map(|(total, checked_in)| EventStat::new(event_id, *total, *checked_in))
            .unwrap_or_else(|| EventStat::empty(event_id)))
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64> {
        self.check(|f| f.aggregates, "aggregate").await?;
        let data = self.data.read().await;
        let count = data.registrations.values().filter(|r| r.event_id == event_id).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
