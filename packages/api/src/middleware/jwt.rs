use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hyper::header::AUTHORIZATION;
use sea_orm::EntityTrait;

use crate::entity::sea_orm_active_enums::UserRole;
use crate::entity::user;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: UserRole,
    pub name: String,
}

/// Request identity, injected as an extension on every request.
#[derive(Debug, Clone)]
pub enum AppUser {
    Known(AuthUser),
    Anonymous,
}

impl AppUser {
    /// Unpack the identity, answering 401 for anonymous callers.
    pub fn required(&self) -> Result<&AuthUser, ApiError> {
        match self {
            AppUser::Known(user) => Ok(user),
            AppUser::Anonymous => Err(ApiError::unauthorized("Authentication required")),
        }
    }

    pub fn require_role(&self, role: UserRole) -> Result<&AuthUser, ApiError> {
        let user = self.required()?;
        if user.role == role {
            Ok(user)
        } else {
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    pub fn require_any(&self, roles: &[UserRole]) -> Result<&AuthUser, ApiError> {
        let user = self.required()?;
        if roles.contains(&user.role) {
            Ok(user)
        } else {
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    /// Load the full profile row behind this identity.
    pub async fn get_user(&self, state: &AppState) -> Result<user::Model, ApiError> {
        let auth = self.required()?;
        user::Entity::find_by_id(&auth.id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))
    }
}

/// Resolve the `Authorization` header into an [`AppUser`] extension.
///
/// Requests without the header pass through as [`AppUser::Anonymous`] so
/// public routes keep working. A header that is present but fails
/// verification is rejected outright rather than downgraded to anonymous.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response<Body>, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map(str::to_owned));

    let identity = match header {
        None => AppUser::Anonymous,
        Some(Err(_)) => return Err(ApiError::unauthorized("Invalid or expired token")),
        Some(Ok(raw)) => {
            let token = raw.strip_prefix("Bearer ").unwrap_or(&raw).trim();
            let claims = state.validate_token(token)?;
            AppUser::Known(AuthUser {
                id: claims.sub,
                role: claims.role,
                name: claims.name,
            })
        }
    };

    request.extensions_mut().insert::<AppUser>(identity);
    Ok(next.run(request).await)
}
