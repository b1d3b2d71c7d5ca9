//! Saved-address repository.

use sqlx::PgPool;

use knobsshop_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    user_id: UserId,
    name: Option<String>,
    phone: String,
    street: String,
    city: String,
    district: String,
    pincode: String,
    state: String,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            phone: row.phone,
            street: row.street,
            city: row.city,
            district: row.district,
            pincode: row.pincode,
            state: row.state,
            is_default: row.is_default,
        }
    }
}

const ADDRESS_COLUMNS: &str =
    "id, user_id, name, phone, street, city, district, pincode, state, is_default";

/// Fields accepted on create and update.
#[derive(Debug)]
pub struct AddressInput<'a> {
    pub name: Option<&'a str>,
    pub phone: &'a str,
    pub street: &'a str,
    pub city: &'a str,
    pub district: &'a str,
    pub pincode: &'a str,
    pub state: &'a str,
    pub is_default: bool,
}

/// Repository for saved delivery addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an address. When flagged default, any previous default for the
    /// user is demoted first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: AddressInput<'_>,
    ) -> Result<Address, RepositoryError> {
        if input.is_default {
            self.clear_default(user_id).await?;
        }
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO shop.address
                 (id, user_id, name, phone, street, city, district, pincode, state, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(AddressId::generate())
        .bind(user_id)
        .bind(input.name)
        .bind(input.phone)
        .bind(input.street)
        .bind(input.city)
        .bind(input.district)
        .bind(input.pincode)
        .bind(input.state)
        .bind(input.is_default)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Replace an address's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist.
    pub async fn update(
        &self,
        id: AddressId,
        input: AddressInput<'_>,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE shop.address
             SET name = $2, phone = $3, street = $4, city = $5, district = $6,
                 pincode = $7, state = $8, is_default = $9
             WHERE id = $1
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.phone)
        .bind(input.street)
        .bind(input.city)
        .bind(input.district)
        .bind(input.pincode)
        .bind(input.state)
        .bind(input.is_default)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// A user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.address
             WHERE user_id = $1
             ORDER BY is_default DESC, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The user's current default address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_default(&self, user_id: UserId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.address
             WHERE user_id = $1 AND is_default = TRUE"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Demote the user's default address, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_default(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.address SET is_default = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
