//! Registration repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use super::{insert_error, RegistrationRepository};
use crate::models::registration::Registration;
use crate::utils::errors::{EventManagerError, Result};

#[derive(Clone)]
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn insert(&self, registration: &Registration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO registrations (id, event_id, guest_id, status, checked_in, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(&registration.id)
        .bind(&registration.event_id)
        .bind(&registration.guest_id)
        .bind(&registration.status)
        .bind(registration.checked_in)
        .bind(registration.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, || format!("registration {} already exists", registration.id)))?;

        Ok(())
    }

    async fn update(&self, registration: &Registration) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET event_id = $2,
                guest_id = $3,
                status = $4,
                checked_in = $5
            WHERE id = $1
            "#
        )
        .bind(&registration.id)
        .bind(&registration.event_id)
        .bind(&registration.guest_id)
        .bind(&registration.status)
        .bind(registration.checked_in)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EventManagerError::not_found("Registration", registration.id.clone()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, guest_id, status, checked_in, created_at FROM registrations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, guest_id, status, checked_in, created_at FROM registrations WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    async fn find_by_guest(&self, guest_id: &str) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, guest_id, status, checked_in, created_at FROM registrations WHERE guest_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
