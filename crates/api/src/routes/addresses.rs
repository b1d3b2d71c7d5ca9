//! Saved-address handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use knobsshop_core::{AddressId, UserId};

use crate::db::{AddressRepository, addresses::AddressInput};
use crate::error::AppError;
use crate::models::Address;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressBody {
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub district: String,
    pub pincode: String,
    pub state: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressBody {
    fn as_input(&self) -> AddressInput<'_> {
        AddressInput {
            name: self.name.as_deref(),
            phone: &self.phone,
            street: &self.street,
            city: &self.city,
            district: &self.district,
            pincode: &self.pincode,
            state: &self.state,
            is_default: self.is_default,
        }
    }
}

/// `POST /api/addresses`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<AddressBody>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let address = AddressRepository::new(state.pool())
        .create(body.user_id, body.as_input())
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressBody>,
) -> Result<Json<Address>, AppError> {
    let repo = AddressRepository::new(state.pool());
    if body.is_default {
        repo.clear_default(body.user_id).await?;
    }
    let address = repo.update(id, body.as_input()).await?;
    Ok(Json(address))
}

/// `GET /api/addresses/user/{user_id}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;
    if addresses.is_empty() {
        return Err(AppError::not_found("No addresses found for this user"));
    }
    Ok(Json(addresses))
}
