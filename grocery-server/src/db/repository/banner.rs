//! Banner Repository

use super::{RepoError, RepoResult};
use shared::models::{
    Banner, BannerCreate, BannerUpdate, DEFAULT_BUTTON_LINK, DEFAULT_BUTTON_TEXT,
    DEFAULT_OVERLAY_OPACITY, DEFAULT_TEXT_COLOR, MoveDirection,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, title, subtitle, description, image_url, button_text, button_link, \
    text_color, overlay_opacity, display_order, is_active, created_at, updated_at";

/// Active banners in display order (storefront hero)
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Banner>> {
    let sql = format!("SELECT {COLUMNS} FROM banner WHERE is_active = 1 ORDER BY display_order, id");
    let rows = sqlx::query_as::<_, Banner>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Banner>> {
    let sql = format!("SELECT {COLUMNS} FROM banner ORDER BY display_order, id");
    let rows = sqlx::query_as::<_, Banner>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Banner>> {
    let sql = format!("SELECT {COLUMNS} FROM banner WHERE id = ?");
    let row = sqlx::query_as::<_, Banner>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// New banners go to the end of the list
pub async fn create(pool: &SqlitePool, data: BannerCreate) -> RepoResult<Banner> {
    let sql = format!(
        "INSERT INTO banner (id, title, subtitle, description, image_url, button_text, button_link, \
         text_color, overlay_opacity, display_order, is_active, created_at, updated_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, COALESCE(MAX(display_order) + 1, 0), ?10, ?11, ?11 \
         FROM banner RETURNING {COLUMNS}"
    );
    let banner = sqlx::query_as::<_, Banner>(&sql)
        .bind(snowflake_id())
        .bind(data.title.trim())
        .bind(&data.subtitle)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(data.button_text.as_deref().unwrap_or(DEFAULT_BUTTON_TEXT))
        .bind(data.button_link.as_deref().unwrap_or(DEFAULT_BUTTON_LINK))
        .bind(data.text_color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR))
        .bind(data.overlay_opacity.unwrap_or(DEFAULT_OVERLAY_OPACITY))
        .bind(data.is_active.unwrap_or(true))
        .bind(now_millis())
        .fetch_one(pool)
        .await?;
    Ok(banner)
}

pub async fn update(pool: &SqlitePool, id: i64, data: BannerUpdate) -> RepoResult<Banner> {
    let sql = format!(
        "UPDATE banner SET title = COALESCE(?1, title), subtitle = COALESCE(?2, subtitle), \
         description = COALESCE(?3, description), image_url = COALESCE(?4, image_url), \
         button_text = COALESCE(?5, button_text), button_link = COALESCE(?6, button_link), \
         text_color = COALESCE(?7, text_color), overlay_opacity = COALESCE(?8, overlay_opacity), \
         is_active = COALESCE(?9, is_active), updated_at = ?10 WHERE id = ?11 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Banner>(&sql)
        .bind(data.title.as_deref().map(str::trim))
        .bind(&data.subtitle)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(&data.button_text)
        .bind(&data.button_link)
        .bind(&data.text_color)
        .bind(data.overlay_opacity)
        .bind(data.is_active)
        .bind(now_millis())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Banner {id} not found")))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Banner> {
    update(
        pool,
        id,
        BannerUpdate {
            is_active: Some(is_active),
            ..Default::default()
        },
    )
    .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM banner WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Swap a banner's position with its neighbour. Moving past either end is a
/// no-op. Positions are renumbered to `0..n` on the way. Returns every banner
/// in the new order.
pub async fn move_banner(
    pool: &SqlitePool,
    id: i64,
    direction: MoveDirection,
) -> RepoResult<Vec<Banner>> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let touched = sqlx::query("UPDATE banner SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Banner {id} not found")));
    }

    let mut ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM banner ORDER BY display_order, id")
        .fetch_all(&mut *tx)
        .await?;
    if let Some(pos) = ids.iter().position(|&b| b == id) {
        let neighbour = match direction {
            MoveDirection::Up => pos.checked_sub(1),
            MoveDirection::Down => Some(pos + 1).filter(|&n| n < ids.len()),
        };
        if let Some(n) = neighbour {
            ids.swap(pos, n);
        }
    }

    for (order, banner_id) in ids.iter().enumerate() {
        sqlx::query("UPDATE banner SET display_order = ?1 WHERE id = ?2 AND display_order != ?1")
            .bind(order as i32)
            .bind(banner_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    find_all(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    fn banner(title: &str) -> BannerCreate {
        BannerCreate {
            title: title.into(),
            subtitle: None,
            description: None,
            image_url: format!("https://cdn.example.com/{title}.jpg"),
            button_text: None,
            button_link: None,
            text_color: None,
            overlay_opacity: None,
            is_active: None,
        }
    }

    fn titles(banners: &[Banner]) -> Vec<&str> {
        banners.iter().map(|b| b.title.as_str()).collect()
    }

    #[tokio::test]
    async fn create_appends_with_defaults() {
        let pool = testing::pool().await;
        let a = create(&pool, banner("a")).await.unwrap();
        let b = create(&pool, banner("b")).await.unwrap();
        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);
        assert_eq!(a.button_text, "Shop Now");
        assert_eq!(a.button_link, "/");
        assert_eq!(a.overlay_opacity, 40);
    }

    #[tokio::test]
    async fn move_swaps_with_neighbour() {
        let pool = testing::pool().await;
        create(&pool, banner("a")).await.unwrap();
        let b = create(&pool, banner("b")).await.unwrap();
        create(&pool, banner("c")).await.unwrap();

        let order = move_banner(&pool, b.id, MoveDirection::Up).await.unwrap();
        assert_eq!(titles(&order), vec!["b", "a", "c"]);

        let order = move_banner(&pool, b.id, MoveDirection::Up).await.unwrap();
        assert_eq!(titles(&order), vec!["b", "a", "c"]);

        let order = move_banner(&pool, b.id, MoveDirection::Down).await.unwrap();
        assert_eq!(titles(&order), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn move_unknown_is_not_found() {
        let pool = testing::pool().await;
        create(&pool, banner("a")).await.unwrap();
        assert!(matches!(
            move_banner(&pool, 7, MoveDirection::Down).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn inactive_hidden_from_storefront() {
        let pool = testing::pool().await;
        let a = create(&pool, banner("a")).await.unwrap();
        set_active(&pool, a.id, false).await.unwrap();
        assert!(find_active(&pool).await.unwrap().is_empty());
        assert!(delete(&pool, a.id).await.unwrap());
        assert!(find_all(&pool).await.unwrap().is_empty());
    }
}
