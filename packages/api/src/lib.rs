use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use middleware::jwt::jwt_middleware;
use state::State;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod commissions;
pub mod config;
pub mod entity;
pub mod error;
pub mod mail;
pub mod media;
pub mod otp;
pub mod password;
pub mod payment;
pub mod state;
pub mod token;

mod ids;
mod middleware;
mod routes;

pub use axum;
pub use sea_orm;

pub mod auth {
    use crate::middleware;
    pub use middleware::jwt::{AppUser, AuthUser};
}

pub fn construct_router(state: Arc<State>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .client_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let router = Router::new()
        .nest("/health", routes::health::routes())
        .nest("/auth", routes::auth::routes())
        .nest("/users", routes::users::routes())
        .nest("/products", routes::products::routes())
        .nest("/orders", routes::orders::routes())
        .nest("/payments", routes::payments::routes())
        .nest("/marketers", routes::marketers::routes())
        .nest("/admin", routes::admin::routes())
        .nest("/uploads", routes::uploads::routes())
        .with_state(state.clone())
        .layer(from_fn_with_state(state, jwt_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Router::new().nest("/api", router)
}
