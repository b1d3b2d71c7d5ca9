//! Banner ad handlers.
//!
//! The create body accepts scalar-or-array values for the per-creative fields
//! so a batch upload is one request. All array fields must agree on length
//! and `single` mode refuses batches.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{AdId, AdMode, AdPage, AdPlacement};

use crate::db::{AdRepository, ads::NewAd};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::Ad;
use crate::state::AppState;

/// A field that arrives as either one value or a list of values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    fn len(&self) -> Option<usize> {
        match self {
            Self::One(_) => None,
            Self::Many(values) => Some(values.len()),
        }
    }

    /// The value at `index`, repeating a scalar for every creative.
    fn get(&self, index: usize) -> Option<T> {
        match self {
            Self::One(value) => Some(value.clone()),
            Self::Many(values) => values.get(index).cloned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAdsBody {
    pub mode: AdMode,
    pub title: OneOrMany<String>,
    pub description: OneOrMany<String>,
    pub placement: AdPlacement,
    pub page: AdPage,
    pub image: OneOrMany<String>,
    pub link: Option<OneOrMany<String>>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub cta_button: Option<OneOrMany<String>>,
}

fn batch_size(body: &CreateAdsBody) -> Result<usize, AppError> {
    let lengths: Vec<usize> = [
        body.title.len(),
        body.description.len(),
        body.image.len(),
        body.link.as_ref().and_then(OneOrMany::len),
        body.cta_button.as_ref().and_then(OneOrMany::len),
    ]
    .into_iter()
    .flatten()
    .collect();

    let count = lengths.first().copied().unwrap_or(1);
    if lengths.iter().any(|&l| l != count) {
        return Err(AppError::bad_request("Array fields must have equal length"));
    }
    if count == 0 {
        return Err(AppError::bad_request("At least one creative is required"));
    }
    if body.mode == AdMode::Single && count > 1 {
        return Err(AppError::bad_request(
            "Single mode accepts exactly one creative",
        ));
    }
    Ok(count)
}

/// `POST /api/ads`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<CreateAdsBody>,
) -> Result<(StatusCode, Json<Vec<Ad>>), AppError> {
    let count = batch_size(&body)?;

    let mut ads = Vec::with_capacity(count);
    for i in 0..count {
        // Lengths are validated above; missing values cannot happen here.
        let (Some(title), Some(description), Some(image)) = (
            body.title.get(i),
            body.description.get(i),
            body.image.get(i),
        ) else {
            return Err(AppError::bad_request("Array fields must have equal length"));
        };
        ads.push(NewAd {
            mode: body.mode,
            title,
            description,
            placement: body.placement,
            page: body.page,
            image,
            link: body.link.as_ref().and_then(|l| l.get(i)),
            from_date: body.from_date,
            to_date: body.to_date,
            cta_button: body.cta_button.as_ref().and_then(|c| c.get(i)),
        });
    }

    let created = AdRepository::new(state.pool()).create_batch(ads).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/ads`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Ad>>, AppError> {
    let ads = AdRepository::new(state.pool()).list_all().await?;
    Ok(Json(ads))
}

/// `GET /api/ads/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<AdId>,
) -> Result<Json<Ad>, AppError> {
    let ad = AdRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Ad not found"))?;
    Ok(Json(ad))
}

/// `DELETE /api/ads/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<AdId>,
) -> Result<Json<serde_json::Value>, AppError> {
    AdRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "message": "Ad deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(mode: AdMode, titles: OneOrMany<String>) -> CreateAdsBody {
        CreateAdsBody {
            mode,
            title: titles,
            description: OneOrMany::One("desc".into()),
            placement: AdPlacement::Banner,
            page: AdPage::HomePage,
            image: OneOrMany::One("a.jpg".into()),
            link: None,
            from_date: None,
            to_date: None,
            cta_button: None,
        }
    }

    #[test]
    fn scalar_body_is_a_batch_of_one() {
        let b = body(AdMode::Single, OneOrMany::One("Sale".into()));
        assert_eq!(batch_size(&b).unwrap(), 1);
    }

    #[test]
    fn single_mode_rejects_batches() {
        let b = body(
            AdMode::Single,
            OneOrMany::Many(vec!["A".into(), "B".into()]),
        );
        assert!(batch_size(&b).is_err());
    }

    #[test]
    fn mismatched_array_lengths_rejected() {
        let mut b = body(
            AdMode::Multiple,
            OneOrMany::Many(vec!["A".into(), "B".into()]),
        );
        b.image = OneOrMany::Many(vec!["a.jpg".into()]);
        assert!(batch_size(&b).is_err());
    }

    #[test]
    fn multiple_mode_takes_array_length() {
        let mut b = body(
            AdMode::Multiple,
            OneOrMany::Many(vec!["A".into(), "B".into(), "C".into()]),
        );
        b.image = OneOrMany::Many(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()]);
        assert_eq!(batch_size(&b).unwrap(), 3);
    }
}
