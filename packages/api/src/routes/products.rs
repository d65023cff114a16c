use axum::extract::{Path, Query, State};
use axum::{Extension, Json, Router, routing::get};
use chrono::Utc;
use hyper::StatusCode;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::prelude::*;
use crate::entity::product::{self, ImageList};
use crate::entity::user;
use crate::entity::sea_orm_active_enums::{ProductCategory, UserRole};
use crate::error::ApiError;
use crate::ids::new_id;
use crate::middleware::jwt::{AppUser, AuthUser};
use crate::state::AppState;

use super::PaginationParams;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{product_id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub sub_category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub seller: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ProductFilter {
    fn page(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

fn lowered(column: product::Column) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((product::Entity, column)))).into()
}

fn contains_ci(column: product::Column, needle: &str) -> SimpleExpr {
    lowered(column).like(format!("%{}%", needle.to_lowercase()))
}

#[derive(Debug, Serialize)]
pub struct SellerSummary {
    pub id: String,
    pub name: String,
}

/// Catalog responses embed who sells the item, preferring the storefront name.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub seller: Option<SellerSummary>,
}

fn with_seller(product: product::Model, seller: Option<user::Model>) -> ProductView {
    let seller = seller.map(|s| SellerSummary {
        name: s.display_name().to_string(),
        id: s.id,
    });
    ProductView { product, seller }
}

#[tracing::instrument(name = "GET /products", skip(state, filter))]
async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let mut query = Product::find();

    if let Some(category) = filter.category {
        query = query.filter(product::Column::Category.eq(category));
    }
    if let Some(sub_category) = &filter.sub_category {
        // exact subcategory match, case-insensitive
        query = query.filter(lowered(product::Column::SubCategory).eq(sub_category.to_lowercase()));
    }
    if let Some(featured) = filter.featured {
        query = query.filter(product::Column::IsFeatured.eq(featured));
    }
    if let Some(seller) = &filter.seller {
        query = query.filter(product::Column::SellerId.eq(seller));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(product::Column::Name, search))
                    .add(contains_ci(product::Column::Description, search))
                    .add(contains_ci(product::Column::Category, search))
                    .add(contains_ci(product::Column::SubCategory, search)),
            );
        }
    }

    let page = filter.page();
    let products = query
        .find_also_related(User)
        .order_by_desc(product::Column::CreatedAt)
        .limit(page.limit(20, 100))
        .offset(page.offset())
        .all(&state.db)
        .await?;

    Ok(Json(
        products
            .into_iter()
            .map(|(product, seller)| with_seller(product, seller))
            .collect(),
    ))
}

#[tracing::instrument(name = "GET /products/{id}", skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let (found, seller) = Product::find_by_id(&product_id)
        .find_also_related(User)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(Json(with_seller(found, seller)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub category: ProductCategory,
    pub sub_category: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: i64,
    /// Admins create on behalf of a seller; sellers always create their own.
    pub seller_id: Option<String>,
}

#[tracing::instrument(name = "POST /products", skip(state, user, payload))]
async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<product::Model>), ApiError> {
    let auth = user.require_any(&[UserRole::Seller, UserRole::Admin])?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("Product name is required"));
    }
    if payload.price <= 0 {
        return Err(ApiError::bad_request("Price must be positive"));
    }
    if payload.stock < 0 {
        return Err(ApiError::bad_request("Stock cannot be negative"));
    }

    let seller_id = match auth.role {
        UserRole::Seller => auth.id.clone(),
        UserRole::Admin => {
            let seller_id = payload
                .seller_id
                .ok_or_else(|| ApiError::bad_request("sellerId is required"))?;
            let seller = User::find_by_id(&seller_id)
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::not_found("Seller not found"))?;
            if seller.role != UserRole::Seller {
                return Err(ApiError::bad_request("Target user is not a seller"));
            }
            seller_id
        }
        UserRole::Customer | UserRole::Marketer => {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }
    };

    let now = Utc::now().naive_utc();
    let created = product::ActiveModel {
        id: Set(new_id()),
        name: Set(payload.name.trim().to_string()),
        category: Set(payload.category),
        sub_category: Set(payload.sub_category),
        price: Set(payload.price),
        original_price: Set(payload.original_price),
        description: Set(payload.description),
        images: Set(ImageList(payload.images)),
        stock: Set(payload.stock),
        rating: Set(0.0),
        review_count: Set(0),
        is_featured: Set(false),
        seller_id: Set(seller_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub sub_category: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<Option<i64>>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i64>,
    pub is_featured: Option<bool>,
}

impl UpdateProduct {
    /// True when anything beyond the featured flag is being changed.
    fn touches_more_than_featured(&self) -> bool {
        self.name.is_some()
            || self.category.is_some()
            || self.sub_category.is_some()
            || self.price.is_some()
            || self.original_price.is_some()
            || self.description.is_some()
            || self.images.is_some()
            || self.stock.is_some()
    }
}

/// An admin touching a product it does not own may only toggle the featured
/// flag; a payload carrying anything else is rejected whole, nothing is
/// partially applied.
#[tracing::instrument(name = "PUT /products/{id}", skip(state, user, payload))]
async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<product::Model>, ApiError> {
    let auth = user.require_any(&[UserRole::Seller, UserRole::Admin])?;

    let found = Product::find_by_id(&product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let is_owner = found.seller_id == auth.id;
    if auth.role == UserRole::Seller && !is_owner {
        return Err(ApiError::forbidden("Not your product"));
    }
    if auth.role == UserRole::Admin && !is_owner && payload.touches_more_than_featured() {
        return Err(ApiError::forbidden(
            "Admins may only change the featured flag on another seller's product",
        ));
    }

    let mut active = found.into_active_model();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Product name is required"));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(sub_category) = payload.sub_category {
        active.sub_category = Set(sub_category);
    }
    if let Some(price) = payload.price {
        if price <= 0 {
            return Err(ApiError::bad_request("Price must be positive"));
        }
        active.price = Set(price);
    }
    if let Some(original_price) = payload.original_price {
        active.original_price = Set(original_price);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(images) = payload.images {
        active.images = Set(ImageList(images));
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(ApiError::bad_request("Stock cannot be negative"));
        }
        active.stock = Set(stock);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

/// Deletion stays with the owning seller.
#[tracing::instrument(name = "DELETE /products/{id}", skip(state, user))]
async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let auth: &AuthUser = user.require_role(UserRole::Seller)?;

    let found = Product::find_by_id(&product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    if found.seller_id != auth.id {
        return Err(ApiError::forbidden("Not your product"));
    }

    found.delete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
