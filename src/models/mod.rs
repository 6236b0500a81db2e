//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod analytics;
pub mod event;
pub mod guest;
pub mod registration;
pub mod user;

// Re-export commonly used models
pub use analytics::{
    AnalyticsOverview, EventGuestStat, EventStat, EventTypeGuestStat, Granularity,
    LocationGuestStat, ParticipationTrendPoint,
};
pub use event::{
    CreateEventRequest, Event, EventFilter, EventStatus, EventType, StatusFilter,
    UpdateEventRequest,
};
pub use guest::{CreateGuestRequest, Guest, UpdateGuestRequest};
pub use registration::{RegisterRequest, Registration};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserStatus};
