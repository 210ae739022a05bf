//! Address Repository
//!
//! A user has at most one default address. The first address saved becomes
//! the default; saving or switching to a new default clears the old one.

use super::{RepoError, RepoResult};
use shared::models::{Address, AddressInput};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, user_id, label, street, building, apartment, area, city, emirate, \
    landmark, is_default, created_at";

/// Default first, then newest
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Address>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM address WHERE user_id = ? ORDER BY is_default DESC, created_at DESC"
    );
    let rows = sqlx::query_as::<_, Address>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// An address only if it belongs to `user_id`
pub async fn find_for_user(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> RepoResult<Option<Address>> {
    let sql = format!("SELECT {COLUMNS} FROM address WHERE id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, Address>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, user_id: i64, data: &AddressInput) -> RepoResult<Address> {
    let mut tx = pool.begin().await?;
    let address = insert(&mut tx, user_id, data).await?;
    tx.commit().await?;
    Ok(address)
}

/// Insert inside the caller's transaction
pub async fn insert(
    conn: &mut SqliteConnection,
    user_id: i64,
    data: &AddressInput,
) -> RepoResult<Address> {
    let id = snowflake_id();
    let sql = format!(
        "INSERT INTO address (id, user_id, label, street, building, apartment, area, city, emirate, \
         landmark, is_default, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
         CASE WHEN ?11 OR NOT EXISTS (SELECT 1 FROM address WHERE user_id = ?2) THEN 1 ELSE 0 END, ?12) \
         RETURNING {COLUMNS}"
    );
    let address = sqlx::query_as::<_, Address>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(data.label.trim())
        .bind(data.street.trim())
        .bind(&data.building)
        .bind(&data.apartment)
        .bind(data.area.trim())
        .bind(data.city.trim())
        .bind(data.emirate.trim())
        .bind(&data.landmark)
        .bind(data.is_default)
        .bind(now_millis())
        .fetch_one(&mut *conn)
        .await?;

    if address.is_default {
        clear_other_defaults(conn, user_id, address.id).await?;
    }
    Ok(address)
}

/// Replace every field of an owned address
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    data: &AddressInput,
) -> RepoResult<Address> {
    let mut tx = pool.begin().await?;
    let sql = format!(
        "UPDATE address SET label = ?1, street = ?2, building = ?3, apartment = ?4, area = ?5, \
         city = ?6, emirate = ?7, landmark = ?8, is_default = (is_default OR ?9) \
         WHERE id = ?10 AND user_id = ?11 RETURNING {COLUMNS}"
    );
    let address = sqlx::query_as::<_, Address>(&sql)
        .bind(data.label.trim())
        .bind(data.street.trim())
        .bind(&data.building)
        .bind(&data.apartment)
        .bind(data.area.trim())
        .bind(data.city.trim())
        .bind(data.emirate.trim())
        .bind(&data.landmark)
        .bind(data.is_default)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Address {id} not found")))?;

    if data.is_default {
        clear_other_defaults(&mut tx, user_id, id).await?;
    }
    tx.commit().await?;
    Ok(address)
}

/// Make `id` the only default address of `user_id`
pub async fn set_default(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE address SET is_default = (id = ?2) WHERE user_id = ?1 \
         AND EXISTS (SELECT 1 FROM address WHERE id = ?2 AND user_id = ?1)",
    )
    .bind(user_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Address {id} not found")));
    }
    Ok(())
}

/// Delete an owned address. If it was the default, the newest remaining
/// address takes over.
pub async fn delete(pool: &SqlitePool, user_id: i64, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let was_default: Option<bool> =
        sqlx::query_scalar("DELETE FROM address WHERE id = ? AND user_id = ? RETURNING is_default")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(was_default) = was_default else {
        return Ok(false);
    };
    if was_default {
        sqlx::query(
            "UPDATE address SET is_default = 1 WHERE id = \
             (SELECT id FROM address WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT 1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(true)
}

async fn clear_other_defaults(
    conn: &mut SqliteConnection,
    user_id: i64,
    keep: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE address SET is_default = 0 WHERE user_id = ? AND id != ? AND is_default = 1")
        .bind(user_id)
        .bind(keep)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::profile::{self, fixtures::new_profile};
    use crate::db::repository::testing;
    use shared::models::Role;

    fn input(street: &str, is_default: bool) -> AddressInput {
        AddressInput {
            label: "Home".into(),
            street: street.into(),
            building: None,
            apartment: None,
            area: "Al Barsha".into(),
            city: "Dubai".into(),
            emirate: "Dubai".into(),
            landmark: None,
            is_default,
        }
    }

    async fn user(pool: &SqlitePool, email: &str) -> i64 {
        profile::create(pool, new_profile(email, Role::Customer))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn first_address_becomes_default() {
        let pool = testing::pool().await;
        let uid = user(&pool, "a@example.com").await;
        let first = create(&pool, uid, &input("1st St", false)).await.unwrap();
        let second = create(&pool, uid, &input("2nd St", false)).await.unwrap();
        assert!(first.is_default);
        assert!(!second.is_default);
    }

    #[tokio::test]
    async fn only_one_default() {
        let pool = testing::pool().await;
        let uid = user(&pool, "a@example.com").await;
        let first = create(&pool, uid, &input("1st St", false)).await.unwrap();
        let second = create(&pool, uid, &input("2nd St", true)).await.unwrap();
        assert!(second.is_default);

        let all = find_by_user(&pool, uid).await.unwrap();
        assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
        assert_eq!(all[0].id, second.id);

        set_default(&pool, uid, first.id).await.unwrap();
        let all = find_by_user(&pool, uid).await.unwrap();
        assert_eq!(all[0].id, first.id);
        assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
    }

    #[tokio::test]
    async fn other_users_address_is_invisible() {
        let pool = testing::pool().await;
        let owner = user(&pool, "owner@example.com").await;
        let other = user(&pool, "other@example.com").await;
        let addr = create(&pool, owner, &input("1st St", false)).await.unwrap();

        assert!(find_for_user(&pool, other, addr.id).await.unwrap().is_none());
        assert!(matches!(
            set_default(&pool, other, addr.id).await,
            Err(RepoError::NotFound(_))
        ));
        assert!(!delete(&pool, other, addr.id).await.unwrap());
        assert!(matches!(
            update(&pool, other, addr.id, &input("x", false)).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_default_promotes_another() {
        let pool = testing::pool().await;
        let uid = user(&pool, "a@example.com").await;
        let first = create(&pool, uid, &input("1st St", false)).await.unwrap();
        let second = create(&pool, uid, &input("2nd St", false)).await.unwrap();

        assert!(delete(&pool, uid, first.id).await.unwrap());
        let left = find_by_user(&pool, uid).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second.id);
        assert!(left[0].is_default);
    }
}
