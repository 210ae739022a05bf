//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::{now_millis, slugify, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, name, name_ar, slug, image_url, display_order, is_active, created_at, updated_at";

/// Active categories in display order (storefront)
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM category WHERE is_active = 1 ORDER BY display_order, name"
    );
    let rows = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Every category, active or not (back-office)
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category ORDER BY display_order, name");
    let rows = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category WHERE id = ?");
    let row = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category WHERE slug = ? LIMIT 1");
    let row = sqlx::query_as::<_, Category>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Number of products (active or not) filed under a category
pub async fn count_products(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a category. The slug defaults to one derived from the name.
pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let slug = resolve_slug(data.slug.as_deref(), &data.name)?;
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO category (id, name, name_ar, slug, image_url, display_order, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.name_ar)
    .bind(&slug)
    .bind(&data.image_url)
    .bind(data.display_order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_slug(e, &slug))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let slug = match data.slug.as_deref() {
        Some(s) => Some(resolve_slug(Some(s), data.name.as_deref().unwrap_or_default())?),
        None => None,
    };
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), name_ar = COALESCE(?2, name_ar), \
         slug = COALESCE(?3, slug), image_url = COALESCE(?4, image_url), \
         display_order = COALESCE(?5, display_order), is_active = COALESCE(?6, is_active), \
         updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.name_ar)
    .bind(&slug)
    .bind(&data.image_url)
    .bind(data.display_order)
    .bind(data.is_active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_slug(e, slug.as_deref().unwrap_or_default()))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Delete a category that no product refers to
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if count_products(pool, id).await? > 0 {
        return Err(RepoError::Validation(
            "Cannot delete a category that still has products".into(),
        ));
    }
    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Explicit slug (normalised) or one generated from the name
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> RepoResult<String> {
    let slug = match explicit {
        Some(s) if !s.trim().is_empty() => slugify(s),
        _ => slugify(name),
    };
    if slug.is_empty() {
        return Err(RepoError::Validation(
            "Slug must contain at least one latin letter or digit".into(),
        ));
    }
    Ok(slug)
}

fn duplicate_slug(err: sqlx::Error, slug: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Category slug '{slug}'")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn fruit() -> CategoryCreate {
        CategoryCreate {
            name: "Fresh Fruit".into(),
            name_ar: Some("فواكه".into()),
            slug: None,
            image_url: None,
            display_order: Some(2),
            is_active: None,
        }
    }

    #[tokio::test]
    async fn create_generates_slug() {
        let pool = testing::pool().await;
        let cat = create(&pool, fruit()).await.unwrap();
        assert_eq!(cat.slug, "fresh-fruit");
        assert!(cat.is_active);
        assert_eq!(
            find_by_slug(&pool, "fresh-fruit").await.unwrap().unwrap().id,
            cat.id
        );
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let pool = testing::pool().await;
        create(&pool, fruit()).await.unwrap();
        let err = create(&pool, fruit()).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn arabic_only_name_needs_explicit_slug() {
        let pool = testing::pool().await;
        let data = CategoryCreate {
            name: "خضار".into(),
            ..fruit()
        };
        assert!(matches!(
            create(&pool, data).await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn inactive_hidden_from_storefront() {
        let pool = testing::pool().await;
        let cat = create(&pool, fruit()).await.unwrap();
        update(
            &pool,
            cat.id,
            CategoryUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(find_active(&pool).await.unwrap().is_empty());
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let pool = testing::pool().await;
        let err = update(&pool, 42, CategoryUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
