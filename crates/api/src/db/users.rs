//! Customer account repository.
//!
//! Password hashes and OTP columns never leave this module as part of a
//! domain model; login and OTP flows get them through dedicated accessors.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use knobsshop_core::{Email, ProductId, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct FrontUserRow {
    id: UserId,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    profile_url: String,
    gender: Option<String>,
    company: String,
    gst: String,
    date_of_birth: Option<NaiveDate>,
    used_coupons: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<FrontUserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: FrontUserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| RepositoryError::corrupt("invalid email in database", e))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            phone: row.phone,
            profile_url: row.profile_url,
            gender: row.gender,
            company: row.company,
            gst: row.gst,
            date_of_birth: row.date_of_birth,
            used_coupons: row.used_coupons,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, profile_url, gender, company, gst, \
     date_of_birth, used_coupons, created_at, updated_at";

/// Stored login credential for a customer.
#[derive(Debug, sqlx::FromRow)]
pub struct StoredCredential {
    pub user_id: UserId,
    pub password_hash: String,
}

/// Stored OTP challenge for a customer.
#[derive(Debug, sqlx::FromRow)]
pub struct StoredOtp {
    pub user_id: UserId,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
}

/// New account parameters. Exactly one of `email`/`phone` may be `None`.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: Option<&'a Email>,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
}

/// Repository for customer accounts and the wishlist.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether an account exists with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shop.front_user WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether an account exists with this phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_phone(&self, phone: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shop.front_user WHERE phone = $1)",
        )
        .bind(phone)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is taken.
    pub async fn create(&self, new: NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, FrontUserRow>(&format!(
            "INSERT INTO shop.front_user (id, name, email, phone, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(UserId::generate())
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique("account already exists"))?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, FrontUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.front_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, FrontUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.front_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, FrontUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.front_user WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up the password hash for an email login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredCredential>(
            "SELECT id AS user_id, password_hash FROM shop.front_user WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Look up the password hash for a phone login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn credential_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredCredential>(
            "SELECT id AS user_id, password_hash FROM shop.front_user WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Update mutable profile fields. The handler merges the incoming body
    /// into the loaded profile and saves the result here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_profile(&self, user: &User) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, FrontUserRow>(&format!(
            "UPDATE shop.front_user
             SET name = $2, email = $3, phone = $4, profile_url = $5, gender = $6,
                 date_of_birth = $7, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(user.email.as_ref())
        .bind(user.phone.as_deref())
        .bind(&user.profile_url)
        .bind(user.gender.as_deref())
        .bind(user.date_of_birth)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::on_unique("email already in use"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Store an OTP challenge against an email or phone identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account matches.
    pub async fn set_otp(
        &self,
        identifier: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserId, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, UserId>(
            "UPDATE shop.front_user
             SET otp_code = $2, otp_expires_at = $3, updated_at = now()
             WHERE email = $1 OR phone = $1
             RETURNING id",
        )
        .bind(identifier)
        .bind(code)
        .bind(expires_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(user_id)
    }

    /// Fetch the stored OTP for an identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_otp(&self, identifier: &str) -> Result<Option<StoredOtp>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredOtp>(
            "SELECT id AS user_id, otp_code, otp_expires_at
             FROM shop.front_user
             WHERE email = $1 OR phone = $1",
        )
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Clear the OTP columns after a successful verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_otp(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE shop.front_user SET otp_code = NULL, otp_expires_at = NULL WHERE id = $1",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Replace the password hash (reset flow).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.front_user SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Record GST details supplied during checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_gst_details(
        &self,
        user_id: UserId,
        gst: &str,
        company: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE shop.front_user SET gst = $2, company = $3, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(gst)
        .bind(company)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Append a coupon code to the user's used list, once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn mark_coupon_used(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.front_user
             SET used_coupons = array_append(used_coupons, $2), updated_at = now()
             WHERE id = $1 AND NOT ($2 = ANY(used_coupons))",
        )
        .bind(user_id)
        .bind(code)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either unknown user or already recorded; disambiguate.
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM shop.front_user WHERE id = $1)",
            )
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
            if !exists {
                return Err(RepositoryError::NotFound);
            }
        }
        Ok(())
    }

    /// Every registered account (analytics reductions).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, FrontUserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.front_user ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    // --- wishlist -----------------------------------------------------------

    /// Add a product to the wishlist. Returns `false` when it was already
    /// there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist_add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO shop.wishlist_item (user_id, product_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Product ids on the user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist_product_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM shop.wishlist_item
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair wasn't on the list.
    pub async fn wishlist_remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM shop.wishlist_item WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shop.wishlist_item WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
