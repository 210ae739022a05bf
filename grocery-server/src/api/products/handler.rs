//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::convert::not_found_as;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::db::repository::product::{self, ProductFilter};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_price, validate_required_text, validate_stock,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductCreate, ProductDetail, ProductUpdate};

const QUICK_SEARCH_LIMIT: i64 = 5;
const RELATED_LIMIT: i64 = 6;

/// Storefront listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category slug
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub on_sale: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveToggle {
    pub is_active: bool,
}

/// GET /api/products - active products, newest first
pub async fn list_active(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        featured: query.featured,
        on_sale: query.on_sale,
        limit: query.limit.filter(|l| *l > 0),
    };
    Ok(Json(product::find_active(state.pool(), &filter).await?))
}

/// GET /api/products/search?q=&category=
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    Ok(Json(product::search(state.pool(), &query.q, category, None).await?))
}

/// GET /api/products/quick-search?q= - header search box
pub async fn quick_search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(
        product::search(state.pool(), &query.q, None, Some(QUICK_SEARCH_LIMIT)).await?,
    ))
}

async fn find_active(state: &ServerState, id: i64) -> AppResult<Product> {
    product::find_by_id(state.pool(), id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::product_not_found(id))
}

/// GET /api/products/{id} - active product with its category
pub async fn get_active(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductDetail>> {
    let product = find_active(&state, id).await?;
    let category = match product.category_id {
        Some(cid) => category::find_by_id(state.pool(), cid).await?,
        None => None,
    };
    Ok(Json(ProductDetail { product, category }))
}

/// GET /api/products/{id}/related - more from the same category
pub async fn related(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Product>>> {
    let product = find_active(&state, id).await?;
    Ok(Json(product::find_related(state.pool(), &product, RELATED_LIMIT).await?))
}

/// GET /api/admin/products - every product, inactive included
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(product::find_all(state.pool()).await?))
}

async fn ensure_category(state: &ServerState, category_id: Option<i64>) -> AppResult<()> {
    if let Some(cid) = category_id
        && category::find_by_id(state.pool(), cid).await?.is_none()
    {
        return Err(AppError::category_not_found(cid));
    }
    Ok(())
}

fn validate_texts(
    name_ar: Option<&str>,
    description: Option<&str>,
    description_ar: Option<&str>,
    image_url: Option<&str>,
    images: &[String],
    unit: Option<&str>,
    weight: Option<&str>,
) -> AppResult<()> {
    validate_optional_text(name_ar, "name_ar", MAX_NAME_LEN)?;
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(description_ar, "description_ar", MAX_NOTE_LEN)?;
    validate_optional_text(image_url, "image_url", MAX_URL_LEN)?;
    for url in images {
        validate_required_text(url, "images", MAX_URL_LEN)?;
    }
    if let Some(unit) = unit {
        validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(weight, "weight", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// POST /api/admin/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price, payload.sale_price)?;
    validate_stock(payload.stock_quantity.unwrap_or(0))?;
    validate_texts(
        payload.name_ar.as_deref(),
        payload.description.as_deref(),
        payload.description_ar.as_deref(),
        payload.image_url.as_deref(),
        &payload.images,
        payload.unit.as_deref(),
        payload.weight.as_deref(),
    )?;
    ensure_category(&state, payload.category_id).await?;

    let created = product::create(state.pool(), payload).await?;
    tracing::info!(product_id = created.id, name = %created.name, "Product created");
    Ok(Json(created))
}

/// PUT /api/admin/products/{id} - partial update
///
/// Price and sale price are checked together against the stored values.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let current = product::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))?;

    if let Some(name) = payload.name.as_deref() {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let price = payload.price.unwrap_or(current.price);
    let sale_price = payload.sale_price.unwrap_or(current.sale_price);
    validate_price(price, sale_price)?;
    if let Some(stock) = payload.stock_quantity {
        validate_stock(stock)?;
    }
    validate_texts(
        payload.name_ar.as_deref(),
        payload.description.as_deref(),
        payload.description_ar.as_deref(),
        payload.image_url.as_deref(),
        payload.images.as_deref().unwrap_or_default(),
        payload.unit.as_deref(),
        payload.weight.as_deref(),
    )?;
    ensure_category(&state, payload.category_id).await?;

    let updated = product::update(state.pool(), id, payload)
        .await
        .map_err(not_found_as(ErrorCode::ProductNotFound, id))?;
    tracing::info!(product_id = id, "Product updated");
    Ok(Json(updated))
}

/// PUT /api/admin/products/{id}/active
pub async fn set_active(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActiveToggle>,
) -> AppResult<Json<Product>> {
    let updated = product::set_active(state.pool(), id, payload.is_active)
        .await
        .map_err(not_found_as(ErrorCode::ProductNotFound, id))?;
    tracing::info!(product_id = id, is_active = payload.is_active, "Product visibility changed");
    Ok(Json(updated))
}

/// DELETE /api/admin/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !product::delete(state.pool(), id).await? {
        return Err(AppError::product_not_found(id));
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(ApiResponse::ok()))
}
