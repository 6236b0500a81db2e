//! Integration tests for the guest coordinator

use assert_matches::assert_matches;
use event_manager::models::registration::status;
use event_manager::models::{CreateGuestRequest, UpdateGuestRequest};
use event_manager::EventManagerError;

use crate::helpers::{guest_request, guest_request_with_phone, TestContext};

#[tokio::test]
async fn test_create_requires_contact() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;

    let request = CreateGuestRequest {
        full_name: "Nguyễn Văn An".to_string(),
        email: Some("   ".to_string()),
        phone: None,
        ..Default::default()
    };
    let err = guests.create(request, "e1").await.unwrap_err();
    assert_matches!(err, EventManagerError::Validation(_));
    assert_eq!(ctx.store.guest_count().await, 0);

    assert!(guests.create(guest_request(), "e1").await.is_ok());
    assert!(guests.create(guest_request_with_phone(), "e1").await.is_ok());
}

#[tokio::test]
async fn test_create_requires_name_and_event() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;

    let nameless = CreateGuestRequest {
        full_name: " ".to_string(),
        ..guest_request()
    };
    assert_matches!(
        guests.create(nameless, "e1").await,
        Err(EventManagerError::Validation(_))
    );
    assert_matches!(
        guests.create(guest_request(), "").await,
        Err(EventManagerError::Validation(_))
    );
}

#[tokio::test]
async fn test_create_links_pending_registration() {
    let ctx = TestContext::new();
    let guest = ctx.services.guest_service.create(guest_request(), "e1").await.unwrap();

    let registrations = ctx
        .services
        .registration_service
        .list_by_guest(&guest.id)
        .await
        .unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].event_id, "e1");
    assert_eq!(registrations[0].status, status::PENDING);
    assert!(!registrations[0].checked_in);
}

#[tokio::test]
async fn test_ensure_repoints_existing_registration() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;
    let guest = guests.create(guest_request(), "e1").await.unwrap();
    let original = ctx
        .services
        .registration_service
        .list_by_guest(&guest.id)
        .await
        .unwrap()
        .remove(0);

    let repointed = guests.ensure_guest_registration(&guest.id, "e2").await.unwrap();

    assert_eq!(repointed.id, original.id);
    assert_eq!(repointed.event_id, "e2");
    assert_eq!(ctx.store.registration_count().await, 1);

    let stored = ctx
        .services
        .registration_service
        .get_by_id(&original.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.event_id, "e2");
}

#[tokio::test]
async fn test_failed_link_removes_new_guest() {
    let ctx = TestContext::new();
    ctx.store.set_fail_on_registration_write(true).await;

    let err = ctx
        .services
        .guest_service
        .create(guest_request(), "e1")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("create registration"));
    assert_eq!(err.status_code(), 500);
    assert_eq!(ctx.store.guest_count().await, 0);
    assert_eq!(ctx.store.registration_count().await, 0);
}

#[tokio::test]
async fn test_failed_compensation_returns_link_error() {
    let ctx = TestContext::new();
    ctx.store.set_fail_on_registration_write(true).await;
    ctx.store.set_fail_on_guest_delete(true).await;

    let err = ctx
        .services
        .guest_service
        .create(guest_request(), "e1")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("create registration"));
    // The swallowed delete failure leaves the guest behind
    assert_eq!(ctx.store.guest_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_ensure_creates_single_registration() {
    let ctx = TestContext::new();
    let guests = ctx.services.guest_service.clone();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let guests = guests.clone();
            tokio::spawn(async move {
                guests
                    .ensure_guest_registration("g-concurrent", &format!("e{}", i))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ctx.store.registration_count().await, 1);
}

#[tokio::test]
async fn test_update_guest() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;
    let guest = guests.create(guest_request(), "e1").await.unwrap();

    let updated = guests
        .update(
            &guest.id,
            UpdateGuestRequest {
                phone: Some("0912 345 678".to_string()),
                ..Default::default()
            },
            Some("e3"),
        )
        .await
        .unwrap();

    assert_eq!(updated.full_name, guest.full_name);
    assert_eq!(updated.email, guest.email);
    assert_eq!(updated.phone.as_deref(), Some("0912 345 678"));

    let registrations = ctx
        .services
        .registration_service
        .list_by_guest(&guest.id)
        .await
        .unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].event_id, "e3");
}

#[tokio::test]
async fn test_update_cannot_remove_last_contact() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;
    let guest = guests.create(guest_request(), "e1").await.unwrap();

    let err = guests
        .update(
            &guest.id,
            UpdateGuestRequest {
                email: Some(String::new()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, EventManagerError::Validation(_));
}

#[tokio::test]
async fn test_update_and_delete_missing_guest() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;

    assert_matches!(
        guests.update("ghost", UpdateGuestRequest::default(), None).await,
        Err(EventManagerError::NotFound { entity: "Guest", .. })
    );
    assert_matches!(
        guests.delete("ghost").await,
        Err(EventManagerError::NotFound { .. })
    );
    assert!(guests.get_by_id("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_by_keyword() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;
    for (name, email, phone) in [
        ("Trần Thị Bình", Some("binh@example.com"), None),
        ("Lê Minh", None, Some("0987654321")),
        ("Phạm Hoa", Some("hoa@company.vn"), None),
    ] {
        guests
            .create(
                CreateGuestRequest {
                    id: None,
                    full_name: name.to_string(),
                    email: email.map(str::to_string),
                    phone: phone.map(str::to_string),
                },
                "e1",
            )
            .await
            .unwrap();
    }

    assert_eq!(guests.list(None).await.unwrap().len(), 3);
    assert_eq!(guests.list(Some("  ")).await.unwrap().len(), 3);

    let by_email = guests.list(Some("EXAMPLE.COM")).await.unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].full_name, "Trần Thị Bình");

    let by_phone = guests.list(Some("98765")).await.unwrap();
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].full_name, "Lê Minh");

    assert!(guests.list(Some("nobody")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_by_contact() {
    let ctx = TestContext::new();
    let guests = &ctx.services.guest_service;
    let by_email = guests
        .create(
            CreateGuestRequest {
                full_name: "Email Guest".to_string(),
                email: Some("guest@example.com".to_string()),
                ..Default::default()
            },
            "e1",
        )
        .await
        .unwrap();
    let by_phone = guests
        .create(
            CreateGuestRequest {
                full_name: "Phone Guest".to_string(),
                phone: Some("+84-ABC-123".to_string()),
                ..Default::default()
            },
            "e1",
        )
        .await
        .unwrap();

    let found = guests
        .find_by_contact(Some("guest@example.com"), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, by_email.id);

    // Unknown email falls back to the phone scan
    let found = guests
        .find_by_contact(Some("other@example.com"), Some("+84-abc-123"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, by_phone.id);

    assert!(guests
        .find_by_contact(Some("other@example.com"), Some("000"))
        .await
        .unwrap()
        .is_none());
    assert!(guests.find_by_contact(None, None).await.unwrap().is_none());
}
