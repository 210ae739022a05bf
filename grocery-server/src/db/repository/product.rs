//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate, default_unit};
use shared::util::{escape_like, now_millis, snowflake_id};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, name_ar, description, description_ar, price, sale_price, \
    image_url, images, category_id, stock_quantity, unit, weight, is_active, is_featured, \
    created_at, updated_at";

/// Storefront listing filter
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Category slug
    pub category: Option<String>,
    pub featured: bool,
    /// Only products whose sale price undercuts the list price
    pub on_sale: bool,
    pub limit: Option<i64>,
}

/// Active products, newest first
pub async fn find_active(pool: &SqlitePool, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM product WHERE is_active = 1 \
         AND (?1 IS NULL OR category_id = (SELECT id FROM category WHERE slug = ?1)) \
         AND (?2 = 0 OR is_featured = 1) \
         AND (?3 = 0 OR (sale_price IS NOT NULL AND sale_price < price)) \
         ORDER BY created_at DESC, id DESC LIMIT ?4"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(&filter.category)
        .bind(filter.featured)
        .bind(filter.on_sale)
        .bind(filter.limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Every product, newest first (back-office)
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM product ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM product WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Products with the given ids, in any order; unknown ids are skipped
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {COLUMNS} FROM product WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, Product>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Other active products from the same category
pub async fn find_related(pool: &SqlitePool, product: &Product, limit: i64) -> RepoResult<Vec<Product>> {
    let Some(category_id) = product.category_id else {
        return Ok(Vec::new());
    };
    let sql = format!(
        "SELECT {COLUMNS} FROM product WHERE is_active = 1 AND category_id = ? AND id != ? \
         ORDER BY created_at DESC, id DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(category_id)
        .bind(product.id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Case-insensitive substring search over name and description of active
/// products, ordered by name. A blank query matches nothing.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    category: Option<&str>,
    limit: Option<i64>,
) -> RepoResult<Vec<Product>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(&query.to_ascii_lowercase()));
    let sql = format!(
        "SELECT {COLUMNS} FROM product WHERE is_active = 1 \
         AND (lower(name) LIKE ?1 ESCAPE '\\' OR lower(COALESCE(description, '')) LIKE ?1 ESCAPE '\\') \
         AND (?2 IS NULL OR category_id = (SELECT id FROM category WHERE slug = ?2)) \
         ORDER BY name COLLATE NOCASE LIMIT ?3"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(pattern)
        .bind(category)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO product (id, name, name_ar, description, description_ar, price, sale_price, \
         image_url, images, category_id, stock_quantity, unit, weight, is_active, is_featured, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.name_ar)
    .bind(&data.description)
    .bind(&data.description_ar)
    .bind(data.price)
    .bind(data.sale_price)
    .bind(&data.image_url)
    .bind(Json(&data.images))
    .bind(data.category_id)
    .bind(data.stock_quantity.unwrap_or(0))
    .bind(data.unit.clone().unwrap_or_else(default_unit))
    .bind(&data.weight)
    .bind(data.is_active.unwrap_or(true))
    .bind(data.is_featured.unwrap_or(false))
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    // ?7 flags whether sale_price was sent at all; ?8 is the new value (may be NULL)
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), name_ar = COALESCE(?2, name_ar), \
         description = COALESCE(?3, description), description_ar = COALESCE(?4, description_ar), \
         price = COALESCE(?5, price), image_url = COALESCE(?6, image_url), \
         sale_price = CASE WHEN ?7 THEN ?8 ELSE sale_price END, \
         images = COALESCE(?9, images), category_id = COALESCE(?10, category_id), \
         stock_quantity = COALESCE(?11, stock_quantity), unit = COALESCE(?12, unit), \
         weight = COALESCE(?13, weight), is_active = COALESCE(?14, is_active), \
         is_featured = COALESCE(?15, is_featured), updated_at = ?16 WHERE id = ?17",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.name_ar)
    .bind(&data.description)
    .bind(&data.description_ar)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.sale_price.is_some())
    .bind(data.sale_price.flatten())
    .bind(data.images.as_ref().map(Json))
    .bind(data.category_id)
    .bind(data.stock_quantity)
    .bind(&data.unit)
    .bind(&data.weight)
    .bind(data.is_active)
    .bind(data.is_featured)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Product> {
    let rows = sqlx::query("UPDATE product SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(is_active)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Hard delete. Order lines keep their snapshot and lose the reference.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Catalog data captured when stock is taken
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockTaken {
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub image_url: Option<String>,
}

/// Decrement stock of an active product if enough is on hand.
///
/// `None` means the product is missing, inactive or short; nothing was written.
pub async fn take_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
    now: i64,
) -> RepoResult<Option<StockTaken>> {
    let row = sqlx::query_as::<_, StockTaken>(
        "UPDATE product SET stock_quantity = stock_quantity - ?1, updated_at = ?2 \
         WHERE id = ?3 AND is_active = 1 AND stock_quantity >= ?1 \
         RETURNING name, price, sale_price, image_url",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

pub async fn count_active(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product WHERE is_active = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn product(name: &str, price: f64, stock: i64) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            name_ar: None,
            description: None,
            description_ar: None,
            price,
            sale_price: None,
            image_url: None,
            images: vec![],
            category_id: None,
            stock_quantity: Some(stock),
            unit: None,
            weight: None,
            is_active: None,
            is_featured: None,
        }
    }
}
