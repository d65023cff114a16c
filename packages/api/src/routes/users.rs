use axum::extract::State;
use axum::{Extension, Json, Router, routing::put};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};

use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::user;
use crate::error::ApiError;
use crate::middleware::jwt::AppUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", put(update_me))
}

/// Profile shape handed to clients. Never carries credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            store_name: model.store_name,
            phone: model.phone,
            address: Address {
                line1: model.address_line1,
                line2: model.address_line2,
                city: model.address_city,
                state: model.address_state,
                postal_code: model.address_postal_code,
                country: model.address_country,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub store_name: Option<String>,
    pub address: Option<Address>,
}

#[tracing::instrument(name = "PUT /users/me", skip(state, user, payload))]
async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<UpdateProfile>,
) -> Result<Json<UserProfile>, ApiError> {
    let current = user.get_user(&state).await?;
    let is_seller = current.role == UserRole::Seller;
    let mut active = current.into_active_model();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(store_name) = payload.store_name {
        if !is_seller {
            return Err(ApiError::bad_request("Only sellers have a store name"));
        }
        active.store_name = Set(Some(store_name));
    }
    if let Some(address) = payload.address {
        active.address_line1 = Set(address.line1);
        active.address_line2 = Set(address.line2);
        active.address_city = Set(address.city);
        active.address_state = Set(address.state);
        active.address_postal_code = Set(address.postal_code);
        active.address_country = Set(address.country);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(Json(UserProfile::from(updated)))
}
