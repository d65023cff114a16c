use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::Redirect;
use axum::{Extension, Json, Router, routing::get, routing::post};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::entity::image;
use crate::entity::prelude::*;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::error::ApiError;
use crate::ids::new_id;
use crate::media::MAX_UPLOAD_BYTES;
use crate::middleware::jwt::AppUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image))
        .route("/{image_id}", get(get_image))
        // a little headroom over the upload cap for multipart framing
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

/// Accepts a single image part, pushes the bytes to the CDN store and
/// persists only the metadata.
#[tracing::instrument(name = "POST /uploads", skip(state, user, multipart))]
async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<image::Model>), ApiError> {
    let auth = user.require_any(&[UserRole::Seller, UserRole::Admin])?;
    let store = state.image_store()?.clone();

    let mut found_part = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") || field.name() == Some("image") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await?;
            found_part = Some((content_type, original_name, bytes));
            break;
        }
    }

    let Some((content_type, original_name, bytes)) = found_part else {
        return Err(ApiError::bad_request("No file part in upload"));
    };
    if !content_type.starts_with("image/") {
        return Err(ApiError::bad_request("Only image uploads are accepted"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request("Image exceeds the 4 MiB limit"));
    }
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let image_id = new_id();
    let filename = format!("{}-{}", image_id, original_name);
    let stored = store
        .upload(&filename, bytes.to_vec())
        .await
        .map_err(|err| {
            tracing::error!("Image upload failed: {}", err);
            ApiError::upstream("Image upload failed")
        })?;

    let size = bytes.len() as i64;
    let created = image::ActiveModel {
        id: Set(image_id),
        filename: Set(filename),
        original_name: Set(original_name),
        url: Set(stored.url),
        provider_id: Set(stored.provider_id),
        size: Set(size),
        uploaded_by: Set(auth.id.clone()),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "GET /uploads/{id}", skip(state))]
async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Result<Redirect, ApiError> {
    let found = Image::find_by_id(&image_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;
    Ok(Redirect::temporary(&found.url))
}
