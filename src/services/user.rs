//! User service implementation
//!
//! This service handles user creation, profile updates and account activation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::database::repositories::UserRepository;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User, UserStatus, DEFAULT_ROLE};
use crate::utils::errors::{EventManagerError, Result};
use crate::utils::helpers::{generate_id, is_valid_email, non_blank, require_id, with_timeout};

/// Page size used when a listing asks for zero users
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page a single listing may return
pub const MAX_PAGE_SIZE: i64 = 100;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: Arc<dyn UserRepository>, timeout: Duration) -> Self {
        Self {
            user_repository,
            timeout,
        }
    }

    /// Create an active user with the default role
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let username = non_blank(&request.username);
        let email = non_blank(&request.email);
        let full_name = non_blank(&request.full_name);
        let (Some(username), Some(email), Some(full_name)) = (username, email, full_name) else {
            return Err(EventManagerError::validation(
                "Username, email and full name are required",
            ));
        };
        if !is_valid_email(email) {
            return Err(EventManagerError::validation(format!("Invalid email: {}", email)));
        }

        debug!(username = %username, "Attempting to create user");
        let existing = with_timeout(
            self.timeout,
            "find user by username",
            self.user_repository.find_by_username(username),
        )
        .await?;
        if existing.is_some() {
            warn!(username = %username, "Username already taken");
            return Err(EventManagerError::Conflict(format!(
                "username '{}' already exists",
                username
            )));
        }

        let now = Utc::now();
        let user = User {
            id: generate_id(),
            username: username.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            status: UserStatus::Active,
            role: DEFAULT_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        };
        with_timeout(self.timeout, "create user", self.user_repository.insert(&user)).await?;

        info!(user_id = %user.id, username = %user.username, "New user created successfully");
        Ok(user)
    }

    /// Update user profile; blank fields are left unchanged
    pub async fn update_profile(&self, id: &str, request: UpdateUserRequest) -> Result<User> {
        let mut user = self.load(id).await?;

        if let Some(full_name) = request.full_name.as_deref().and_then(non_blank) {
            user.full_name = full_name.to_string();
        }
        if let Some(email) = request.email.as_deref().and_then(non_blank) {
            if !is_valid_email(email) {
                return Err(EventManagerError::validation(format!("Invalid email: {}", email)));
            }
            user.email = email.to_string();
        }

        let user = self.save(user, "update user").await?;
        info!(user_id = %user.id, "User profile updated successfully");
        Ok(user)
    }

    pub async fn deactivate(&self, id: &str) -> Result<User> {
        self.set_status(id, UserStatus::Inactive).await
    }

    pub async fn activate(&self, id: &str) -> Result<User> {
        self.set_status(id, UserStatus::Active).await
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = require_id(id, "User ID")?;
        debug!(user_id = %id, "Getting user by ID");
        with_timeout(self.timeout, "get user", self.user_repository.find_by_id(id)).await
    }

    /// Newest users first
    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        if limit < 0 || offset < 0 {
            return Err(EventManagerError::validation("Limit and offset must not be negative"));
        }
        let limit = match limit {
            0 => DEFAULT_PAGE_SIZE,
            l => l.min(MAX_PAGE_SIZE),
        };
        with_timeout(self.timeout, "list users", self.user_repository.list(limit, offset)).await
    }

    async fn set_status(&self, id: &str, status: UserStatus) -> Result<User> {
        let mut user = self.load(id).await?;
        user.status = status;

        let user = self.save(user, "update user status").await?;
        info!(user_id = %user.id, status = status.as_str(), "User status changed");
        Ok(user)
    }

    async fn load(&self, id: &str) -> Result<User> {
        let id = require_id(id, "User ID")?;
        with_timeout(self.timeout, "get user", self.user_repository.find_by_id(id))
            .await?
            .ok_or_else(|| EventManagerError::not_found("User", id))
    }

    async fn save(&self, mut user: User, operation: &str) -> Result<User> {
        user.updated_at = Utc::now();
        with_timeout(self.timeout, operation, self.user_repository.update(&user)).await?;
        Ok(user)
    }
}
