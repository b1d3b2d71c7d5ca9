//! Editorial content handlers: brochures, the essentials section, shelves,
//! policies and consultation requests.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{BrochureId, EssentialsId, PolicyStatus, PolicyTitle, ShelfId};

use crate::db::{
    ContentRepository,
    content::{BrochureInput, ConsultationInput},
};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{
    Brochure, Consultation, Essentials, EssentialsCard, Policy, PolicyVersion, Shelf,
};
use crate::state::AppState;

// --- brochures --------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BrochureBody {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub pdf_link: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl BrochureBody {
    fn as_input(&self) -> BrochureInput<'_> {
        BrochureInput {
            title: &self.title,
            subtitle: self.subtitle.as_deref(),
            description: self.description.as_deref(),
            images: &self.images,
            pdf_link: self.pdf_link.as_deref(),
            category: self.category.as_deref(),
            tags: &self.tags,
            is_active: self.is_active,
        }
    }
}

/// `POST /api/brochures`
pub async fn create_brochure(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<BrochureBody>,
) -> Result<(StatusCode, Json<Brochure>), AppError> {
    if body.title.trim().is_empty() {
        return Err(AppError::bad_request("Brochure title is required"));
    }
    let brochure = ContentRepository::new(state.pool())
        .create_brochure(body.as_input())
        .await?;
    Ok((StatusCode::CREATED, Json(brochure)))
}

/// `GET /api/brochures`
pub async fn list_brochures(State(state): State<AppState>) -> Result<Json<Vec<Brochure>>, AppError> {
    let brochures = ContentRepository::new(state.pool()).list_brochures().await?;
    Ok(Json(brochures))
}

/// `GET /api/brochures/{id}`
pub async fn show_brochure(
    State(state): State<AppState>,
    Path(id): Path<BrochureId>,
) -> Result<Json<Brochure>, AppError> {
    let brochure = ContentRepository::new(state.pool())
        .get_brochure(id)
        .await?
        .ok_or_else(|| AppError::not_found("Brochure not found"))?;
    Ok(Json(brochure))
}

/// `PUT /api/brochures/{id}`
pub async fn update_brochure(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<BrochureId>,
    Json(body): Json<BrochureBody>,
) -> Result<Json<Brochure>, AppError> {
    let brochure = ContentRepository::new(state.pool())
        .update_brochure(id, body.as_input())
        .await?;
    Ok(Json(brochure))
}

/// `DELETE /api/brochures/{id}`
pub async fn remove_brochure(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<BrochureId>,
) -> Result<Json<serde_json::Value>, AppError> {
    ContentRepository::new(state.pool()).delete_brochure(id).await?;
    Ok(Json(json!({ "message": "Brochure deleted" })))
}

// --- essentials -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EssentialsBody {
    pub main_heading: String,
    pub main_description: String,
    #[serde(default)]
    pub cards: Vec<EssentialsCard>,
}

/// `POST /api/essentials`
pub async fn create_essentials(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<EssentialsBody>,
) -> Result<(StatusCode, Json<Essentials>), AppError> {
    let section = ContentRepository::new(state.pool())
        .create_essentials(&body.main_heading, &body.main_description, &body.cards)
        .await?;
    Ok((StatusCode::CREATED, Json(section)))
}

/// `GET /api/essentials`
pub async fn list_essentials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Essentials>>, AppError> {
    let sections = ContentRepository::new(state.pool()).list_essentials().await?;
    Ok(Json(sections))
}

/// `GET /api/essentials/{id}`
pub async fn show_essentials(
    State(state): State<AppState>,
    Path(id): Path<EssentialsId>,
) -> Result<Json<Essentials>, AppError> {
    let section = ContentRepository::new(state.pool())
        .get_essentials(id)
        .await?
        .ok_or_else(|| AppError::not_found("Essentials section not found"))?;
    Ok(Json(section))
}

/// `PUT /api/essentials/{id}`
pub async fn update_essentials(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<EssentialsId>,
    Json(body): Json<EssentialsBody>,
) -> Result<Json<Essentials>, AppError> {
    let section = ContentRepository::new(state.pool())
        .update_essentials(id, &body.main_heading, &body.main_description, &body.cards)
        .await?;
    Ok(Json(section))
}

/// `DELETE /api/essentials/{id}`
pub async fn remove_essentials(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<EssentialsId>,
) -> Result<Json<serde_json::Value>, AppError> {
    ContentRepository::new(state.pool()).delete_essentials(id).await?;
    Ok(Json(json!({ "message": "Essentials section deleted" })))
}

/// `PUT /api/essentials/{id}/cards/{card_id}`
///
/// Replaces one card in the deck, addressed by its stable card id.
pub async fn replace_essentials_card(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path((id, card_id)): Path<(EssentialsId, String)>,
    Json(card): Json<EssentialsCard>,
) -> Result<Json<Essentials>, AppError> {
    let repo = ContentRepository::new(state.pool());
    let mut section = repo
        .get_essentials(id)
        .await?
        .ok_or_else(|| AppError::not_found("Essentials section not found"))?;

    let slot = section
        .cards
        .iter_mut()
        .find(|c| c.id == card_id)
        .ok_or_else(|| AppError::not_found("Card not found"))?;
    let mut card = card;
    card.id = card_id;
    *slot = card;

    let section = repo
        .update_essentials(
            id,
            &section.main_heading,
            &section.main_description,
            &section.cards,
        )
        .await?;
    Ok(Json(section))
}

// --- shelves ----------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ShelfBody {
    pub heading: Option<String>,
    pub content: Option<String>,
    pub image_url: String,
}

/// `POST /api/shelves`
pub async fn create_shelf(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<ShelfBody>,
) -> Result<(StatusCode, Json<Shelf>), AppError> {
    let shelf = ContentRepository::new(state.pool())
        .create_shelf(
            body.heading.as_deref(),
            body.content.as_deref(),
            &body.image_url,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

/// `GET /api/shelves`
pub async fn list_shelves(State(state): State<AppState>) -> Result<Json<Vec<Shelf>>, AppError> {
    let shelves = ContentRepository::new(state.pool()).list_shelves().await?;
    Ok(Json(shelves))
}

/// `PUT /api/shelves/{id}`
pub async fn update_shelf(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<ShelfId>,
    Json(body): Json<ShelfBody>,
) -> Result<Json<Shelf>, AppError> {
    let shelf = ContentRepository::new(state.pool())
        .update_shelf(
            id,
            body.heading.as_deref(),
            body.content.as_deref(),
            &body.image_url,
        )
        .await?;
    Ok(Json(shelf))
}

/// `DELETE /api/shelves/{id}`
pub async fn remove_shelf(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<ShelfId>,
) -> Result<Json<serde_json::Value>, AppError> {
    ContentRepository::new(state.pool()).delete_shelf(id).await?;
    Ok(Json(json!({ "message": "Shelf deleted" })))
}

// --- policies ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PolicyVersionBody {
    pub content: String,
    #[serde(default)]
    pub status: PolicyStatus,
}

fn parse_title(raw: &str) -> Result<PolicyTitle, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request("Unknown policy title"))
}

/// `GET /api/policies/{title}`
pub async fn policy_latest(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<PolicyVersion>, AppError> {
    let title = parse_title(&title)?;
    let policy = ContentRepository::new(state.pool())
        .get_policy(title)
        .await?
        .ok_or_else(|| AppError::not_found("Policy not found"))?;
    let latest = policy
        .latest_published()
        .ok_or_else(|| AppError::not_found("No published version"))?;
    Ok(Json(latest.clone()))
}

/// `GET /api/policies/{title}/history`
pub async fn policy_history(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Policy>, AppError> {
    let title = parse_title(&title)?;
    let policy = ContentRepository::new(state.pool())
        .get_policy(title)
        .await?
        .ok_or_else(|| AppError::not_found("Policy not found"))?;
    Ok(Json(policy))
}

/// `POST /api/policies/{title}/versions`
pub async fn policy_add_version(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(title): Path<String>,
    Json(body): Json<PolicyVersionBody>,
) -> Result<(StatusCode, Json<Policy>), AppError> {
    let title = parse_title(&title)?;
    let version = PolicyVersion {
        content: body.content,
        status: body.status,
        updated_at: Utc::now(),
    };
    let policy = ContentRepository::new(state.pool())
        .append_policy_version(title, &version)
        .await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

// --- consultations ----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ConsultationBody {
    pub location: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    #[serde(default)]
    pub whatsapp: bool,
    pub email: Option<String>,
    pub budget: Option<String>,
    pub interest: Option<String>,
}

/// `POST /api/consultations`
pub async fn create_consultation(
    State(state): State<AppState>,
    Json(body): Json<ConsultationBody>,
) -> Result<(StatusCode, Json<Consultation>), AppError> {
    let consultation = ContentRepository::new(state.pool())
        .create_consultation(ConsultationInput {
            location: body.location.as_deref(),
            category: body.category.as_deref(),
            name: body.name.as_deref(),
            mobile: body.mobile.as_deref(),
            whatsapp: body.whatsapp,
            email: body.email.as_deref(),
            budget: body.budget.as_deref(),
            interest: body.interest.as_deref(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(consultation)))
}

/// `GET /api/consultations`
pub async fn list_consultations(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
) -> Result<Json<Vec<Consultation>>, AppError> {
    let consultations = ContentRepository::new(state.pool())
        .list_consultations()
        .await?;
    Ok(Json(consultations))
}
