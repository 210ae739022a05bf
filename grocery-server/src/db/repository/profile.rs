//! Profile Repository

use super::{RepoError, RepoResult};
use shared::models::{CustomerSummary, Profile, ProfileUpdate, RiderSummary, Role};
use shared::util::{escape_like, now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, email, password_hash, full_name, phone, role, created_at, updated_at";

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Profile>> {
    let sql = format!("SELECT {COLUMNS} FROM profile WHERE id = ?");
    let row = sqlx::query_as::<_, Profile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Lookup by email, ignoring case
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Profile>> {
    let sql = format!("SELECT {COLUMNS} FROM profile WHERE email = ? LIMIT 1");
    let row = sqlx::query_as::<_, Profile>(&sql)
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: NewProfile) -> RepoResult<Profile> {
    let id = snowflake_id();
    let now = now_millis();
    let email = data.email.trim().to_lowercase();
    sqlx::query(
        "INSERT INTO profile (id, email, password_hash, full_name, phone, role, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(&email)
    .bind(&data.password_hash)
    .bind(&data.full_name)
    .bind(&data.phone)
    .bind(data.role)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Email {email}")),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create profile".into()))
}

/// Create the account, or reset password, name and role if the email exists
pub async fn upsert_by_email(pool: &SqlitePool, data: NewProfile) -> RepoResult<Profile> {
    let email = data.email.trim().to_lowercase();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO profile (id, email, password_hash, full_name, phone, role, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
         ON CONFLICT(email) DO UPDATE SET password_hash = excluded.password_hash, \
         full_name = excluded.full_name, phone = COALESCE(excluded.phone, phone), \
         role = excluded.role, updated_at = excluded.updated_at",
    )
    .bind(snowflake_id())
    .bind(&email)
    .bind(&data.password_hash)
    .bind(&data.full_name)
    .bind(&data.phone)
    .bind(data.role)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_email(pool, &email)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert profile".into()))
}

/// Self-service edit of name and phone
pub async fn update(pool: &SqlitePool, id: i64, data: ProfileUpdate) -> RepoResult<Profile> {
    let rows = sqlx::query(
        "UPDATE profile SET full_name = COALESCE(?1, full_name), phone = COALESCE(?2, phone), \
         updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.phone.as_deref().map(str::trim))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Profile {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Profile {id} not found")))
}

pub async fn set_role(pool: &SqlitePool, id: i64, role: Role) -> RepoResult<Profile> {
    let rows = sqlx::query("UPDATE profile SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Profile {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Profile {id} not found")))
}

pub async fn count_by_role(pool: &SqlitePool, role: Role) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profile WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Customers, newest first, with order count and spend (cancelled orders excluded).
/// `query` matches name, email or phone.
pub async fn list_customers(
    pool: &SqlitePool,
    query: Option<&str>,
) -> RepoResult<Vec<CustomerSummary>> {
    let pattern = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{}%", escape_like(&q.to_lowercase())));
    let rows = sqlx::query_as::<_, CustomerSummary>(
        "SELECT p.id, p.email, p.full_name, p.phone, p.created_at, \
         COUNT(o.id) AS order_count, COALESCE(SUM(o.total), 0.0) AS total_spent \
         FROM profile p \
         LEFT JOIN orders o ON o.user_id = p.id AND o.status != 'cancelled' \
         WHERE p.role = 'customer' AND (?1 IS NULL \
            OR lower(p.email) LIKE ?1 ESCAPE '\\' \
            OR lower(COALESCE(p.full_name, '')) LIKE ?1 ESCAPE '\\' \
            OR COALESCE(p.phone, '') LIKE ?1 ESCAPE '\\') \
         GROUP BY p.id ORDER BY p.created_at DESC",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Riders by name with their current and completed delivery counts
pub async fn list_riders(pool: &SqlitePool) -> RepoResult<Vec<RiderSummary>> {
    let rows = sqlx::query_as::<_, RiderSummary>(
        "SELECT p.id, p.email, p.full_name, p.phone, p.created_at, \
         COALESCE(SUM(CASE WHEN o.status = 'out_for_delivery' THEN 1 ELSE 0 END), 0) AS active_orders, \
         COALESCE(SUM(CASE WHEN o.status = 'delivered' THEN 1 ELSE 0 END), 0) AS delivered_orders \
         FROM profile p LEFT JOIN orders o ON o.rider_id = p.id \
         WHERE p.role = 'rider' \
         GROUP BY p.id ORDER BY COALESCE(p.full_name, p.email) COLLATE NOCASE",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}


#[cfg(test)]
mod tests {
    use super::fixtures::new_profile;
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn email_is_unique_ignoring_case() {
        let pool = testing::pool().await;
        let p = create(&pool, new_profile("Aisha@Example.com", Role::Customer))
            .await
            .unwrap();
        assert_eq!(p.email, "aisha@example.com");

        let err = create(&pool, new_profile("AISHA@example.com", Role::Customer))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let found = find_by_email(&pool, "AISHA@EXAMPLE.COM").await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(p.id));
    }

    #[tokio::test]
    async fn upsert_resets_role() {
        let pool = testing::pool().await;
        let first = create(&pool, new_profile("rider@example.com", Role::Customer))
            .await
            .unwrap();
        let again = upsert_by_email(&pool, new_profile("rider@example.com", Role::Rider))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.role, Role::Rider);
    }

    #[tokio::test]
    async fn lists_split_by_role() {
        let pool = testing::pool().await;
        create(&pool, new_profile("c1@example.com", Role::Customer)).await.unwrap();
        create(&pool, new_profile("c2@example.com", Role::Customer)).await.unwrap();
        let rider = create(&pool, new_profile("r@example.com", Role::Rider)).await.unwrap();

        assert_eq!(list_customers(&pool, None).await.unwrap().len(), 2);
        let hits = list_customers(&pool, Some("C2")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].order_count, 0);
        assert_eq!(hits[0].total_spent, 0.0);

        let riders = list_riders(&pool).await.unwrap();
        assert_eq!(riders.len(), 1);
        assert_eq!(riders[0].id, rider.id);
        assert_eq!(count_by_role(&pool, Role::Customer).await.unwrap(), 2);

        let demoted = set_role(&pool, rider.id, Role::Customer).await.unwrap();
        assert_eq!(demoted.role, Role::Customer);
        assert!(list_riders(&pool).await.unwrap().is_empty());
    }
}
