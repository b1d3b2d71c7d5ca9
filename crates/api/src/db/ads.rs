//! Ad repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use knobsshop_core::{AdId, AdMode, AdPage, AdPlacement};

use super::RepositoryError;
use crate::models::Ad;

#[derive(Debug, sqlx::FromRow)]
struct AdRow {
    id: AdId,
    mode: String,
    title: String,
    description: String,
    placement: String,
    page: String,
    image: String,
    link: Option<String>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
    cta_button: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdRow> for Ad {
    type Error = RepositoryError;

    fn try_from(row: AdRow) -> Result<Self, Self::Error> {
        let mode: AdMode = row
            .mode
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid ad mode", e))?;
        let placement: AdPlacement = row
            .placement
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid ad placement", e))?;
        let page: AdPage = row
            .page
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid ad page", e))?;

        Ok(Self {
            id: row.id,
            mode,
            title: row.title,
            description: row.description,
            placement,
            page,
            image: row.image,
            link: row.link,
            from_date: row.from_date,
            to_date: row.to_date,
            cta_button: row.cta_button,
            created_at: row.created_at,
        })
    }
}

const AD_COLUMNS: &str = "id, mode, title, description, placement, page, image, link, \
     from_date, to_date, cta_button, created_at";

/// One creative to insert; a batch submission fans out into several.
#[derive(Debug)]
pub struct NewAd {
    pub mode: AdMode,
    pub title: String,
    pub description: String,
    pub placement: AdPlacement,
    pub page: AdPage,
    pub image: String,
    pub link: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub cta_button: Option<String>,
}

/// Repository for banner ads.
pub struct AdRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of creatives, returning them in submission order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn create_batch(&self, ads: Vec<NewAd>) -> Result<Vec<Ad>, RepositoryError> {
        let mut created = Vec::with_capacity(ads.len());
        for ad in ads {
            let row = sqlx::query_as::<_, AdRow>(&format!(
                "INSERT INTO shop.ad
                     (id, mode, title, description, placement, page, image, link,
                      from_date, to_date, cta_button)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                 RETURNING {AD_COLUMNS}"
            ))
            .bind(AdId::generate())
            .bind(ad.mode.as_str())
            .bind(&ad.title)
            .bind(&ad.description)
            .bind(ad.placement.as_str())
            .bind(ad.page.as_str())
            .bind(&ad.image)
            .bind(ad.link.as_deref())
            .bind(ad.from_date)
            .bind(ad.to_date)
            .bind(ad.cta_button.as_deref())
            .fetch_one(self.pool)
            .await?;
            created.push(row.try_into()?);
        }
        Ok(created)
    }

    /// All ads, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Ad>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdRow>(&format!(
            "SELECT {AD_COLUMNS} FROM shop.ad ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AdId) -> Result<Option<Ad>, RepositoryError> {
        let row =
            sqlx::query_as::<_, AdRow>(&format!("SELECT {AD_COLUMNS} FROM shop.ad WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ad doesn't exist.
    pub async fn delete(&self, id: AdId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.ad WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
