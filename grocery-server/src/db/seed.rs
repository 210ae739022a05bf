//! Demo account seeding
//!
//! With `SEED_DEMO_USERS=true` the server makes sure one account per role
//! exists at start-up. Existing accounts with these emails get their
//! password, name and role reset.

use shared::error::AppError;
use shared::models::Role;
use sqlx::SqlitePool;

use crate::auth::hash_password;
use crate::db::repository::profile::{self, NewProfile};

pub const DEMO_PASSWORD: &str = "Easy@12345";

struct DemoUser {
    email: &'static str,
    full_name: &'static str,
    phone: &'static str,
    role: Role,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "admin@easygrocery.ae",
        full_name: "Admin User",
        phone: "+971501234567",
        role: Role::Admin,
    },
    DemoUser {
        email: "user@easygrocery.ae",
        full_name: "Demo Customer",
        phone: "+971502345678",
        role: Role::Customer,
    },
    DemoUser {
        email: "rider@easygrocery.ae",
        full_name: "Demo Rider",
        phone: "+971503456789",
        role: Role::Rider,
    },
];

pub async fn seed_demo_users(pool: &SqlitePool) -> Result<(), AppError> {
    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| AppError::internal(format!("Failed to hash demo password: {e}")))?;

    for user in &DEMO_USERS {
        let profile = profile::upsert_by_email(
            pool,
            NewProfile {
                email: user.email.to_string(),
                password_hash: password_hash.clone(),
                full_name: Some(user.full_name.to_string()),
                phone: Some(user.phone.to_string()),
                role: user.role,
            },
        )
        .await?;
        tracing::info!(email = %profile.email, role = %profile.role, "Demo account ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let pool = testing::pool().await;
        seed_demo_users(&pool).await.unwrap();
        seed_demo_users(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profile")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 3);

        let rider = profile::find_by_email(&pool, "rider@easygrocery.ae")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rider.role, Role::Rider);
        assert!(verify_password(DEMO_PASSWORD, &rider.password_hash));
    }
}
