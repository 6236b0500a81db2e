//! Integration tests for registration operations

use assert_matches::assert_matches;
use event_manager::models::registration::status;
use event_manager::models::RegisterRequest;
use event_manager::EventManagerError;

use crate::helpers::{at, register_request, register_request_at, TestContext};

#[tokio::test]
async fn test_register_applies_defaults() {
    let ctx = TestContext::new();
    let registration = ctx
        .services
        .registration_service
        .register(register_request("e1", "g1"))
        .await
        .unwrap();

    assert!(!registration.id.is_empty());
    assert_eq!(registration.status, status::PENDING);
    assert!(!registration.checked_in);

    let stored = ctx
        .services
        .registration_service
        .get_by_id(&registration.id)
        .await
        .unwrap();
    assert_eq!(stored, Some(registration));
}

#[tokio::test]
async fn test_register_keeps_supplied_fields() {
    let ctx = TestContext::new();
    let created_at = at(2024, 3, 1, 9);
    let registration = ctx
        .services
        .registration_service
        .register(RegisterRequest {
            id: Some("r-vip".to_string()),
            status: Some("vip".to_string()),
            ..register_request_at("e1", "g1", created_at)
        })
        .await
        .unwrap();

    assert_eq!(registration.id, "r-vip");
    assert_eq!(registration.status, "vip");
    assert_eq!(registration.created_at, created_at);
}

#[tokio::test]
async fn test_register_requires_event_and_guest() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;

    assert_matches!(
        registrations.register(register_request("", "g1")).await,
        Err(EventManagerError::Validation(_))
    );
    assert_matches!(
        registrations.register(register_request("e1", " ")).await,
        Err(EventManagerError::Validation(_))
    );
}

#[tokio::test]
async fn test_check_in_promotes_pending() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;
    let registration = registrations.register(register_request("e1", "g1")).await.unwrap();

    let checked = registrations.check_in(&registration.id).await.unwrap();
    assert!(checked.checked_in);
    assert_eq!(checked.status, status::CHECKED_IN);

    let stored = registrations.get_by_id(&registration.id).await.unwrap().unwrap();
    assert!(stored.checked_in);
}

#[tokio::test]
async fn test_check_in_keeps_custom_status() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;
    let registration = registrations
        .register(RegisterRequest {
            status: Some("vip".to_string()),
            ..register_request("e1", "g1")
        })
        .await
        .unwrap();

    let checked = registrations.check_in(&registration.id).await.unwrap();
    assert!(checked.checked_in);
    assert_eq!(checked.status, "vip");
}

#[tokio::test]
async fn test_cancel_clears_attendance() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;
    let registration = registrations.register(register_request("e1", "g1")).await.unwrap();
    registrations.check_in(&registration.id).await.unwrap();

    let cancelled = registrations.cancel(&registration.id).await.unwrap();
    assert_eq!(cancelled.status, status::CANCELLED);
    assert!(!cancelled.checked_in);

    // Cancelling again changes nothing
    let again = registrations.cancel(&registration.id).await.unwrap();
    assert_eq!(again.status, status::CANCELLED);
    assert!(!again.checked_in);
}

#[tokio::test]
async fn test_missing_registration() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;

    assert_matches!(
        registrations.check_in("missing").await,
        Err(EventManagerError::NotFound { entity: "Registration", .. })
    );
    assert_matches!(
        registrations.cancel("missing").await,
        Err(EventManagerError::NotFound { .. })
    );
    assert!(registrations.get_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_by_event_and_guest() {
    let ctx = TestContext::new();
    let registrations = &ctx.services.registration_service;
    registrations.register(register_request_at("e1", "g1", at(2024, 5, 2, 10))).await.unwrap();
    registrations.register(register_request_at("e1", "g2", at(2024, 5, 1, 10))).await.unwrap();
    registrations.register(register_request_at("e2", "g1", at(2024, 5, 3, 10))).await.unwrap();

    let by_event = registrations.list_by_event("e1").await.unwrap();
    let guests: Vec<&str> = by_event.iter().map(|r| r.guest_id.as_str()).collect();
    assert_eq!(guests, vec!["g2", "g1"]);

    let by_guest = registrations.list_by_guest("g1").await.unwrap();
    let events: Vec<&str> = by_guest.iter().map(|r| r.event_id.as_str()).collect();
    assert_eq!(events, vec!["e1", "e2"]);

    assert_matches!(
        registrations.list_by_event("").await,
        Err(EventManagerError::Validation(_))
    );
    assert_matches!(
        registrations.list_by_guest("").await,
        Err(EventManagerError::Validation(_))
    );
}
