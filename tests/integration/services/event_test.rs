//! Integration tests for the event service

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use event_manager::database::EventRepository;
use event_manager::models::{
    Event, EventFilter, EventStatus, EventType, UpdateEventRequest,
};
use event_manager::EventManagerError;

use crate::helpers::{event_request, event_request_between, register_request, TestConfig, TestContext};

#[tokio::test]
async fn test_create_derives_status_from_window() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;

    let upcoming = events
        .create(event_request("Launch", Duration::days(2), Duration::hours(3)))
        .await
        .unwrap();
    let ongoing = events
        .create(event_request("Workshop", Duration::hours(-1), Duration::hours(3)))
        .await
        .unwrap();
    let ended = events
        .create(event_request("Retro", Duration::days(-3), Duration::hours(2)))
        .await
        .unwrap();

    assert_eq!(upcoming.status, EventStatus::Upcoming);
    assert_eq!(ongoing.status, EventStatus::Ongoing);
    assert_eq!(ended.status, EventStatus::Ended);

    let stored = events.get_by_id(&ongoing.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Ongoing);
    assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn test_create_keeps_supplied_id() {
    let ctx = TestContext::new();
    let mut request = event_request("Gala", Duration::days(1), Duration::hours(4));
    request.id = Some("gala-2024".to_string());

    let event = ctx.services.event_service.create(request).await.unwrap();
    assert_eq!(event.id, "gala-2024");
}

#[tokio::test]
async fn test_create_rejects_small_limited_event() {
    let ctx = TestContext::new();
    let mut request = event_request("Dinner", Duration::days(1), Duration::hours(2));
    request.event_type = EventType::Limited;
    request.max_guests = 1;

    let err = ctx.services.event_service.create(request.clone()).await.unwrap_err();
    assert_matches!(err, EventManagerError::Validation(_));

    request.max_guests = 2;
    assert!(ctx.services.event_service.create(request).await.is_ok());
}

#[tokio::test]
async fn test_create_accepts_empty_location() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let mut request = event_request("Online meetup", Duration::days(1), Duration::hours(1));
    request.location = String::new();

    let event = events.create(request).await.unwrap();
    assert_eq!(event.location, "");

    let updated = events
        .update(
            &event.id,
            UpdateEventRequest {
                location: Some("Huế".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.location, "Huế");
}

#[tokio::test]
async fn test_create_rejects_inverted_window() {
    let ctx = TestContext::new();
    let start = Utc::now() + Duration::days(2);
    let request = event_request_between("Backwards", start, start - Duration::hours(1));

    let err = ctx.services.event_service.create(request).await.unwrap_err();
    assert_matches!(err, EventManagerError::Validation(_));
}

#[tokio::test]
async fn test_update_without_window_keeps_status() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let event = events
        .create(event_request("Conference", Duration::hours(-2), Duration::hours(8)))
        .await
        .unwrap();

    let updated = events
        .update(
            &event.id,
            UpdateEventRequest {
                name: Some("Conference 2024".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Conference 2024");
    assert_eq!(updated.status, EventStatus::Ongoing);
    assert_eq!(updated.start_date, event.start_date);
    assert_eq!(updated.end_date, event.end_date);
    assert_eq!(updated.created_at, event.created_at);
}

#[tokio::test]
async fn test_update_moving_window_recomputes_status() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let event = events
        .create(event_request("Meetup", Duration::days(3), Duration::hours(2)))
        .await
        .unwrap();

    let now = Utc::now();
    let updated = events
        .update(
            &event.id,
            UpdateEventRequest {
                start_date: Some(now - Duration::days(2)),
                end_date: Some(now - Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, EventStatus::Ended);
}

#[tokio::test]
async fn test_update_missing_event_is_not_found() {
    let ctx = TestContext::new();
    let err = ctx
        .services
        .event_service
        .update("missing", UpdateEventRequest::default())
        .await
        .unwrap_err();

    assert_matches!(err, EventManagerError::NotFound { entity: "Event", .. });
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_then_get_returns_none() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let event = events
        .create(event_request("Temp", Duration::days(1), Duration::hours(1)))
        .await
        .unwrap();

    events.delete(&event.id).await.unwrap();
    assert!(events.get_by_id(&event.id).await.unwrap().is_none());

    let err = events.delete(&event.id).await.unwrap_err();
    assert_matches!(err, EventManagerError::NotFound { .. });
}

#[tokio::test]
async fn test_list_filters_status_and_window() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let now = Utc::now();
    let t1 = now + Duration::days(1);
    let t2 = now + Duration::days(10);

    let inside = events
        .create(event_request_between("Inside", now + Duration::days(2), now + Duration::days(3)))
        .await
        .unwrap();
    // Starts before T1
    events
        .create(event_request_between("Early", now + Duration::hours(12), now + Duration::days(2)))
        .await
        .unwrap();
    // Ends after T2
    events
        .create(event_request_between("Late", now + Duration::days(5), now + Duration::days(11)))
        .await
        .unwrap();
    events
        .create(event_request_between("Running", now - Duration::hours(1), now + Duration::days(5)))
        .await
        .unwrap();

    let filter = EventFilter {
        status: Some("Sắp diễn ra".to_string()),
        from: Some(t1),
        to: Some(t2),
    };
    let listed = events.list(&filter).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec![inside.id.as_str()]);
}

#[tokio::test]
async fn test_list_status_sentinels() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    events
        .create(event_request("Future", Duration::days(1), Duration::hours(1)))
        .await
        .unwrap();
    events
        .create(event_request("Past", Duration::days(-2), Duration::hours(1)))
        .await
        .unwrap();

    let all = events
        .list(&EventFilter {
            status: Some("Tất cả".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let unfiltered = events.list(&EventFilter::default()).await.unwrap();
    assert_eq!(unfiltered.len(), 2);

    let ended = events
        .list(&EventFilter {
            status: Some("ended".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].name, "Past");

    let err = events
        .list(&EventFilter {
            status: Some("postponed".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, EventManagerError::Validation(_));
}

#[tokio::test]
async fn test_list_is_capped() {
    let ctx = TestContext::new_with_config(TestConfig {
        max_list_results: 2,
        ..Default::default()
    });
    let events = &ctx.services.event_service;
    for day in 1..=3 {
        events
            .create(event_request(&format!("Event {}", day), Duration::days(day), Duration::hours(1)))
            .await
            .unwrap();
    }

    let listed = events.list(&EventFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Event 1");
}

#[tokio::test]
async fn test_upcoming_excludes_started_events() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    events
        .create(event_request("Later", Duration::days(4), Duration::hours(1)))
        .await
        .unwrap();
    events
        .create(event_request("Sooner", Duration::days(1), Duration::hours(1)))
        .await
        .unwrap();
    events
        .create(event_request("Now", Duration::hours(-1), Duration::hours(2)))
        .await
        .unwrap();

    let upcoming = events.upcoming().await.unwrap();
    let names: Vec<&str> = upcoming.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Sooner", "Later"]);
    assert!(upcoming.iter().all(|e| e.status == EventStatus::Upcoming));
}

fn stale_event(id: &str, start_offset: Duration, status: EventStatus) -> Event {
    let now = Utc::now();
    let start = now + start_offset;
    Event {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        event_type: EventType::Open,
        status,
        location: "Đà Nẵng".to_string(),
        max_guests: 0,
        start_date: start,
        end_date: start + Duration::hours(2),
        image_urls: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_auto_update_status_is_idempotent() {
    let ctx = TestContext::new();
    let repo = ctx.database.events.clone();
    repo.insert(&stale_event("finished", Duration::days(-2), EventStatus::Upcoming))
        .await
        .unwrap();
    repo.insert(&stale_event("started", Duration::hours(-1), EventStatus::Upcoming))
        .await
        .unwrap();
    repo.insert(&stale_event("current", Duration::days(2), EventStatus::Upcoming))
        .await
        .unwrap();

    let events = &ctx.services.event_service;
    assert_eq!(events.auto_update_status().await.unwrap(), 2);
    assert_eq!(events.auto_update_status().await.unwrap(), 0);

    let stored = repo.find_by_id("finished").await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Ended);
    let stored = repo.find_by_id("started").await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Ongoing);
    let stored = repo.find_by_id("current").await.unwrap().unwrap();
    assert_eq!(stored.status, EventStatus::Upcoming);
}

#[tokio::test]
async fn test_get_by_id_recomputes_stale_status() {
    let ctx = TestContext::new();
    ctx.database
        .events
        .insert(&stale_event("drifted", Duration::days(-1), EventStatus::Ongoing))
        .await
        .unwrap();

    let event = ctx.services.event_service.get_by_id("drifted").await.unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Ended);
}

#[tokio::test]
async fn test_compute_statistics() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let registrations = &ctx.services.registration_service;

    let empty = events.compute_statistics("no-registrations").await.unwrap();
    assert_eq!((empty.total_guests, empty.checked_in, empty.absent), (0, 0, 0));

    let mut ids = Vec::new();
    for guest in ["g1", "g2", "g3"] {
        let registration = registrations.register(register_request("e1", guest)).await.unwrap();
        ids.push(registration.id);
    }
    registrations.check_in(&ids[0]).await.unwrap();
    registrations.check_in(&ids[1]).await.unwrap();

    let stats = events.compute_statistics("e1").await.unwrap();
    assert_eq!(stats.event_id, "e1");
    assert_eq!((stats.total_guests, stats.checked_in, stats.absent), (3, 2, 1));
}

#[tokio::test]
async fn test_attach_image_appends_url() {
    let ctx = TestContext::new();
    let events = &ctx.services.event_service;
    let event = events
        .create(event_request("Expo", Duration::days(5), Duration::hours(6)))
        .await
        .unwrap();

    let updated = events
        .attach_image(&event.id, "hall map.png", b"\x89PNG", "image/png")
        .await
        .unwrap();

    assert_eq!(updated.image_urls.len(), 1);
    assert!(updated.image_urls[0].starts_with("https://cdn.test/uploads/"));
    assert!(updated.image_urls[0].ends_with("hall_map.png"));

    let stored = events.get_by_id(&event.id).await.unwrap().unwrap();
    assert_eq!(stored.image_urls, updated.image_urls);

    let err = events
        .attach_image("missing", "x.png", b"x", "image/png")
        .await
        .unwrap_err();
    assert_matches!(err, EventManagerError::NotFound { .. });
}
