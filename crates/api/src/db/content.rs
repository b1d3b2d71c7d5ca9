//! Content repository: brochures, the essentials section, shelves, policies
//! and consultation requests.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use knobsshop_core::{
    BrochureId, ConsultationId, EssentialsId, PolicyId, PolicyTitle, ShelfId,
};

use super::RepositoryError;
use crate::models::{
    Brochure, Consultation, Essentials, EssentialsCard, Policy, PolicyVersion, Shelf,
};

#[derive(Debug, sqlx::FromRow)]
struct BrochureRow {
    id: BrochureId,
    title: String,
    subtitle: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    pdf_link: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BrochureRow> for Brochure {
    fn from(row: BrochureRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            images: row.images,
            pdf_link: row.pdf_link,
            category: row.category,
            tags: row.tags,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EssentialsRow {
    id: EssentialsId,
    main_heading: String,
    main_description: String,
    cards: Json<Vec<EssentialsCard>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EssentialsRow> for Essentials {
    fn from(row: EssentialsRow) -> Self {
        Self {
            id: row.id,
            main_heading: row.main_heading,
            main_description: row.main_description,
            cards: row.cards.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShelfRow {
    id: ShelfId,
    heading: Option<String>,
    content: Option<String>,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShelfRow> for Shelf {
    fn from(row: ShelfRow) -> Self {
        Self {
            id: row.id,
            heading: row.heading,
            content: row.content,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    id: PolicyId,
    title: String,
    versions: Json<Vec<PolicyVersion>>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = RepositoryError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        let title: PolicyTitle = row
            .title
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid policy title", e))?;
        Ok(Self {
            id: row.id,
            title,
            versions: row.versions.0,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ConsultationRow {
    id: ConsultationId,
    location: Option<String>,
    category: Option<String>,
    name: Option<String>,
    mobile: Option<String>,
    whatsapp: bool,
    email: Option<String>,
    budget: Option<String>,
    interest: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ConsultationRow> for Consultation {
    fn from(row: ConsultationRow) -> Self {
        Self {
            id: row.id,
            location: row.location,
            category: row.category,
            name: row.name,
            mobile: row.mobile,
            whatsapp: row.whatsapp,
            email: row.email,
            budget: row.budget,
            interest: row.interest,
            created_at: row.created_at,
        }
    }
}

const BROCHURE_COLUMNS: &str = "id, title, subtitle, description, images, pdf_link, category, \
     tags, is_active, created_at, updated_at";

/// Fields accepted on brochure create and update.
#[derive(Debug)]
pub struct BrochureInput<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub description: Option<&'a str>,
    pub images: &'a [String],
    pub pdf_link: Option<&'a str>,
    pub category: Option<&'a str>,
    pub tags: &'a [String],
    pub is_active: bool,
}

/// Fields accepted on consultation submission.
#[derive(Debug)]
pub struct ConsultationInput<'a> {
    pub location: Option<&'a str>,
    pub category: Option<&'a str>,
    pub name: Option<&'a str>,
    pub mobile: Option<&'a str>,
    pub whatsapp: bool,
    pub email: Option<&'a str>,
    pub budget: Option<&'a str>,
    pub interest: Option<&'a str>,
}

/// Repository for editorial storefront content.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // --- brochures ----------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_brochure(
        &self,
        input: BrochureInput<'_>,
    ) -> Result<Brochure, RepositoryError> {
        let row = sqlx::query_as::<_, BrochureRow>(&format!(
            "INSERT INTO shop.brochure
                 (id, title, subtitle, description, images, pdf_link, category, tags, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BROCHURE_COLUMNS}"
        ))
        .bind(BrochureId::generate())
        .bind(input.title)
        .bind(input.subtitle)
        .bind(input.description)
        .bind(input.images)
        .bind(input.pdf_link)
        .bind(input.category)
        .bind(input.tags)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// All brochures, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brochures(&self) -> Result<Vec<Brochure>, RepositoryError> {
        let rows = sqlx::query_as::<_, BrochureRow>(&format!(
            "SELECT {BROCHURE_COLUMNS} FROM shop.brochure ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_brochure(&self, id: BrochureId) -> Result<Option<Brochure>, RepositoryError> {
        let row = sqlx::query_as::<_, BrochureRow>(&format!(
            "SELECT {BROCHURE_COLUMNS} FROM shop.brochure WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brochure doesn't exist.
    pub async fn update_brochure(
        &self,
        id: BrochureId,
        input: BrochureInput<'_>,
    ) -> Result<Brochure, RepositoryError> {
        let row = sqlx::query_as::<_, BrochureRow>(&format!(
            "UPDATE shop.brochure
             SET title = $2, subtitle = $3, description = $4, images = $5, pdf_link = $6,
                 category = $7, tags = $8, is_active = $9, updated_at = now()
             WHERE id = $1
             RETURNING {BROCHURE_COLUMNS}"
        ))
        .bind(id)
        .bind(input.title)
        .bind(input.subtitle)
        .bind(input.description)
        .bind(input.images)
        .bind(input.pdf_link)
        .bind(input.category)
        .bind(input.tags)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brochure doesn't exist.
    pub async fn delete_brochure(&self, id: BrochureId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.brochure WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // --- essentials ---------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_essentials(
        &self,
        main_heading: &str,
        main_description: &str,
        cards: &[EssentialsCard],
    ) -> Result<Essentials, RepositoryError> {
        let row = sqlx::query_as::<_, EssentialsRow>(
            "INSERT INTO shop.essentials (id, main_heading, main_description, cards)
             VALUES ($1, $2, $3, $4)
             RETURNING id, main_heading, main_description, cards, created_at, updated_at",
        )
        .bind(EssentialsId::generate())
        .bind(main_heading)
        .bind(main_description)
        .bind(Json(cards))
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_essentials(&self) -> Result<Vec<Essentials>, RepositoryError> {
        let rows = sqlx::query_as::<_, EssentialsRow>(
            "SELECT id, main_heading, main_description, cards, created_at, updated_at
             FROM shop.essentials
             ORDER BY created_at",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_essentials(
        &self,
        id: EssentialsId,
    ) -> Result<Option<Essentials>, RepositoryError> {
        let row = sqlx::query_as::<_, EssentialsRow>(
            "SELECT id, main_heading, main_description, cards, created_at, updated_at
             FROM shop.essentials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Replace a section (heading, description, full card deck).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section doesn't exist.
    pub async fn update_essentials(
        &self,
        id: EssentialsId,
        main_heading: &str,
        main_description: &str,
        cards: &[EssentialsCard],
    ) -> Result<Essentials, RepositoryError> {
        let row = sqlx::query_as::<_, EssentialsRow>(
            "UPDATE shop.essentials
             SET main_heading = $2, main_description = $3, cards = $4, updated_at = now()
             WHERE id = $1
             RETURNING id, main_heading, main_description, cards, created_at, updated_at",
        )
        .bind(id)
        .bind(main_heading)
        .bind(main_description)
        .bind(Json(cards))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the section doesn't exist.
    pub async fn delete_essentials(&self, id: EssentialsId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.essentials WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // --- shelves ------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_shelf(
        &self,
        heading: Option<&str>,
        content: Option<&str>,
        image_url: &str,
    ) -> Result<Shelf, RepositoryError> {
        let row = sqlx::query_as::<_, ShelfRow>(
            "INSERT INTO shop.shelf (id, heading, content, image_url)
             VALUES ($1, $2, $3, $4)
             RETURNING id, heading, content, image_url, created_at, updated_at",
        )
        .bind(ShelfId::generate())
        .bind(heading)
        .bind(content)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_shelves(&self) -> Result<Vec<Shelf>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShelfRow>(
            "SELECT id, heading, content, image_url, created_at, updated_at
             FROM shop.shelf ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shelf doesn't exist.
    pub async fn update_shelf(
        &self,
        id: ShelfId,
        heading: Option<&str>,
        content: Option<&str>,
        image_url: &str,
    ) -> Result<Shelf, RepositoryError> {
        let row = sqlx::query_as::<_, ShelfRow>(
            "UPDATE shop.shelf
             SET heading = $2, content = $3, image_url = $4, updated_at = now()
             WHERE id = $1
             RETURNING id, heading, content, image_url, created_at, updated_at",
        )
        .bind(id)
        .bind(heading)
        .bind(content)
        .bind(image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shelf doesn't exist.
    pub async fn delete_shelf(&self, id: ShelfId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.shelf WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // --- policies -----------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_policy(&self, title: PolicyTitle) -> Result<Option<Policy>, RepositoryError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            "SELECT id, title, versions FROM shop.policy WHERE title = $1",
        )
        .bind(title.as_str())
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Append a version to a policy, creating the policy row on first write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn append_policy_version(
        &self,
        title: PolicyTitle,
        version: &PolicyVersion,
    ) -> Result<Policy, RepositoryError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            "INSERT INTO shop.policy (id, title, versions)
             VALUES ($1, $2, jsonb_build_array($3::jsonb))
             ON CONFLICT (title) DO UPDATE
                 SET versions = shop.policy.versions || $3::jsonb
             RETURNING id, title, versions",
        )
        .bind(PolicyId::generate())
        .bind(title.as_str())
        .bind(Json(version))
        .fetch_one(self.pool)
        .await?;
        row.try_into()
    }

    // --- consultations ------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_consultation(
        &self,
        input: ConsultationInput<'_>,
    ) -> Result<Consultation, RepositoryError> {
        let row = sqlx::query_as::<_, ConsultationRow>(
            "INSERT INTO shop.consultation
                 (id, location, category, name, mobile, whatsapp, email, budget, interest)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id, location, category, name, mobile, whatsapp, email, budget,
                       interest, created_at",
        )
        .bind(ConsultationId::generate())
        .bind(input.location)
        .bind(input.category)
        .bind(input.name)
        .bind(input.mobile)
        .bind(input.whatsapp)
        .bind(input.email)
        .bind(input.budget)
        .bind(input.interest)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// All consultation requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_consultations(&self) -> Result<Vec<Consultation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ConsultationRow>(
            "SELECT id, location, category, name, mobile, whatsapp, email, budget,
                    interest, created_at
             FROM shop.consultation
             ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
