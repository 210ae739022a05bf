//! Profile Model (accounts: customers, admins, riders)

use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Role {
    #[default]
    Customer,
    Admin,
    Rider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Rider => "rider",
        }
    }

    /// Where a freshly signed-in user lands.
    ///
    /// Admins and riders always go to their own app; customers return to
    /// `next` when it is a local path, otherwise to `/`.
    pub fn home_path(&self, next: Option<&str>) -> String {
        match self {
            Role::Admin => "/admin".to_string(),
            Role::Rider => "/rider".to_string(),
            Role::Customer => match next {
                Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
                _ => "/".to_string(),
            },
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            "rider" => Ok(Role::Rider),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Self-service profile update (role is never client-controlled here)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Profile with a count of the caller's orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOverview {
    #[serde(flatten)]
    pub profile: Profile,
    pub order_count: i64,
}

/// Customer row in the admin customer list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerSummary {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    pub order_count: i64,
    pub total_spent: f64,
}

/// Rider row in the admin rider list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RiderSummary {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    /// Orders currently out for delivery with this rider
    pub active_orders: i64,
    pub delivered_orders: i64,
}

/// Create rider payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderCreate {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_path_by_role() {
        assert_eq!(Role::Admin.home_path(Some("/cart")), "/admin");
        assert_eq!(Role::Rider.home_path(None), "/rider");
        assert_eq!(Role::Customer.home_path(Some("/checkout")), "/checkout");
        assert_eq!(Role::Customer.home_path(None), "/");
        assert_eq!(Role::Customer.home_path(Some("https://evil.example")), "/");
        assert_eq!(Role::Customer.home_path(Some("//evil.example")), "/");
    }

    #[test]
    fn role_serde_and_parse() {
        assert_eq!(serde_json::to_string(&Role::Rider).unwrap(), "\"rider\"");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn password_hash_never_serialized() {
        let p = Profile {
            id: 1,
            email: "a@b.c".into(),
            password_hash: "secret".into(),
            full_name: None,
            phone: None,
            role: Role::Customer,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
    }
}
