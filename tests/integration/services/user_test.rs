//! Integration tests for the user service

use assert_matches::assert_matches;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::name::en::Name;
use fake::Fake;
use event_manager::models::{CreateUserRequest, UpdateUserRequest, UserStatus};
use event_manager::EventManagerError;

use crate::helpers::TestContext;

fn user_request(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_string(),
        email: SafeEmail().fake(),
        full_name: Name().fake(),
    }
}

#[tokio::test]
async fn test_create_user_defaults() {
    let ctx = TestContext::new();
    let username: String = Username().fake();
    let user = ctx.services.user_service.create_user(user_request(&username)).await.unwrap();

    assert_eq!(user.username, username);
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(user.role, "user");

    let stored = ctx.services.user_service.get_user_by_id(&user.id).await.unwrap();
    assert_eq!(stored, Some(user));
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let ctx = TestContext::new();
    let users = &ctx.services.user_service;
    users.create_user(user_request("lan.nguyen")).await.unwrap();

    let err = users.create_user(user_request("lan.nguyen")).await.unwrap_err();
    assert_matches!(err, EventManagerError::Conflict(_));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_create_user_validation() {
    let ctx = TestContext::new();
    let users = &ctx.services.user_service;

    let missing_name = CreateUserRequest {
        full_name: "  ".to_string(),
        ..user_request("minh")
    };
    assert_matches!(
        users.create_user(missing_name).await,
        Err(EventManagerError::Validation(_))
    );

    let bad_email = CreateUserRequest {
        email: "not-an-email".to_string(),
        ..user_request("minh")
    };
    assert_matches!(
        users.create_user(bad_email).await,
        Err(EventManagerError::Validation(_))
    );
}

#[tokio::test]
async fn test_update_profile_skips_blank_fields() {
    let ctx = TestContext::new();
    let users = &ctx.services.user_service;
    let user = users.create_user(user_request("hoa")).await.unwrap();

    let updated = users
        .update_profile(
            &user.id,
            UpdateUserRequest {
                full_name: Some("Phạm Thị Hoa".to_string()),
                email: Some(String::new()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.full_name, "Phạm Thị Hoa");
    assert_eq!(updated.email, user.email);
    assert!(updated.updated_at >= user.updated_at);

    assert_matches!(
        users.update_profile("missing", UpdateUserRequest::default()).await,
        Err(EventManagerError::NotFound { entity: "User", .. })
    );
}

#[tokio::test]
async fn test_deactivate_and_activate() {
    let ctx = TestContext::new();
    let users = &ctx.services.user_service;
    let user = users.create_user(user_request("tuan")).await.unwrap();

    let inactive = users.deactivate(&user.id).await.unwrap();
    assert_eq!(inactive.status, UserStatus::Inactive);
    assert_eq!(inactive.full_name, user.full_name);

    let active = users.activate(&user.id).await.unwrap();
    assert_eq!(active.status, UserStatus::Active);

    let stored = users.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UserStatus::Active);
}

#[tokio::test]
async fn test_list_users_paging() {
    let ctx = TestContext::new();
    let users = &ctx.services.user_service;
    for i in 0..3 {
        users.create_user(user_request(&format!("user{}", i))).await.unwrap();
    }

    assert_eq!(users.list_users(2, 0).await.unwrap().len(), 2);
    assert_eq!(users.list_users(2, 2).await.unwrap().len(), 1);
    assert_eq!(users.list_users(0, 0).await.unwrap().len(), 3);
    assert_matches!(users.list_users(-1, 0).await, Err(EventManagerError::Validation(_)));
    assert_matches!(users.list_users(10, -5).await, Err(EventManagerError::Validation(_)));
}
