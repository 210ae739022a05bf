//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::api::convert::{duplicate_as, not_found_as};
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::db::repository::product::{self, ProductFilter};
use crate::utils::validation::{MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Category, CategoryCreate, CategoryUpdate, Product};

/// A category page
#[derive(Debug, Serialize)]
pub struct CategoryProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

/// GET /api/categories - active categories by display order
pub async fn list_active(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_active(state.pool()).await?))
}

/// GET /api/categories/{slug}/products
pub async fn products_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CategoryProducts>> {
    let category = category::find_by_slug(state.pool(), &slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::category_not_found(slug.clone()))?;
    let filter = ProductFilter {
        category: Some(slug),
        ..Default::default()
    };
    let products = product::find_active(state.pool(), &filter).await?;
    Ok(Json(CategoryProducts { category, products }))
}

/// GET /api/admin/categories - every category, hidden ones included
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(category::find_all(state.pool()).await?))
}

/// POST /api/admin/categories
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(payload.name_ar.as_deref(), "name_ar", MAX_NAME_LEN)?;
    validate_optional_text(payload.slug.as_deref(), "slug", MAX_NAME_LEN)?;
    validate_optional_text(payload.image_url.as_deref(), "image_url", MAX_URL_LEN)?;

    let slug = category::resolve_slug(payload.slug.as_deref(), &payload.name)?;
    let created = category::create(state.pool(), payload)
        .await
        .map_err(duplicate_as(ErrorCode::CategorySlugExists, ("slug", slug.into())))?;

    tracing::info!(category_id = created.id, slug = %created.slug, "Category created");
    Ok(Json(created))
}

/// PUT /api/admin/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = payload.name.as_deref() {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(payload.name_ar.as_deref(), "name_ar", MAX_NAME_LEN)?;
    validate_optional_text(payload.slug.as_deref(), "slug", MAX_NAME_LEN)?;
    validate_optional_text(payload.image_url.as_deref(), "image_url", MAX_URL_LEN)?;

    let slug = match payload.slug.as_deref() {
        Some(s) => category::resolve_slug(Some(s), payload.name.as_deref().unwrap_or_default())?,
        None => String::new(),
    };
    let updated = category::update(state.pool(), id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => duplicate_as(ErrorCode::CategorySlugExists, ("slug", slug.into()))(e),
            other => not_found_as(ErrorCode::CategoryNotFound, id)(other),
        })?;

    tracing::info!(category_id = id, "Category updated");
    Ok(Json(updated))
}

/// DELETE /api/admin/categories/{id}
///
/// Refused while any product still points at the category.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if category::find_by_id(state.pool(), id).await?.is_none() {
        return Err(AppError::category_not_found(id));
    }
    let products = category::count_products(state.pool(), id).await?;
    if products > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasProducts).with_detail("products", products));
    }
    category::delete(state.pool(), id).await?;

    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(ApiResponse::ok()))
}
