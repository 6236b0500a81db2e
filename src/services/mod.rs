//! Services module
//!
//! This module contains business logic services

pub mod analytics;
pub mod event;
pub mod guest;
pub mod registration;
pub mod storage;
pub mod user;

// Re-export commonly used services
pub use analytics::AnalyticsService;
pub use event::EventService;
pub use guest::GuestService;
pub use registration::RegistrationService;
pub use storage::{LocalObjectStorage, ObjectStorage};
pub use user::UserService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub guest_service: GuestService,
    pub registration_service: RegistrationService,
    pub user_service: UserService,
    pub analytics_service: AnalyticsService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        database: &DatabaseService,
        settings: &Settings,
        object_storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let timeout = settings.service.request_timeout();
        let max_list_results = settings.service.max_list_results;

        Self {
            event_service: EventService::new(
                database.events.clone(),
                database.registrations.clone(),
                object_storage,
                timeout,
                max_list_results,
            ),
            guest_service: GuestService::new(
                database.guests.clone(),
                database.registrations.clone(),
                timeout,
                max_list_results,
            ),
            registration_service: RegistrationService::new(database.registrations.clone(), timeout),
            user_service: UserService::new(database.users.clone(), timeout),
            analytics_service: AnalyticsService::new(database.aggregates.clone(), timeout),
        }
    }

    /// Services backed by local object storage as configured
    pub fn from_settings(database: &DatabaseService, settings: &Settings) -> Self {
        let storage = Arc::new(LocalObjectStorage::new(&settings.storage));
        Self::new(database, settings, storage)
    }
}
