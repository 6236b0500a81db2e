//! Guest repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use super::{insert_error, GuestRepository};
use crate::models::guest::Guest;
use crate::utils::errors::{EventManagerError, Result};

#[derive(Clone)]
pub struct PgGuestRepository {
    pool: PgPool,
}

impl PgGuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for PgGuestRepository {
    async fn insert(&self, guest: &Guest) -> Result<()> {
        sqlx::query("INSERT INTO guests (id, full_name, email, phone) VALUES ($1, $2, $3, $4)")
            .bind(&guest.id)
            .bind(&guest.full_name)
            .bind(&guest.email)
            .bind(&guest.phone)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, || format!("guest {} already exists", guest.id)))?;

        Ok(())
    }

    async fn update(&self, guest: &Guest) -> Result<()> {
        let result = sqlx::query(
            "UPDATE guests SET full_name = $2, email = $3, phone = $4 WHERE id = $1"
        )
        .bind(&guest.id)
        .bind(&guest.full_name)
        .bind(&guest.email)
        .bind(&guest.phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EventManagerError::not_found("Guest", guest.id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(
            "SELECT id, full_name, email, phone FROM guests WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guest)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>> {
        let guest = sqlx::query_as::<_, Guest>(
            "SELECT id, full_name, email, phone FROM guests WHERE email = $1 ORDER BY id LIMIT 1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guest)
    }

    async fn find_all(&self) -> Result<Vec<Guest>> {
        let guests = sqlx::query_as::<_, Guest>(
            "SELECT id, full_name, email, phone FROM guests ORDER BY full_name ASC, id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }
}
