//! Address Model

use serde::{Deserialize, Serialize};

/// Saved delivery address of a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub street: String,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub area: String,
    pub city: String,
    pub emirate: String,
    pub landmark: Option<String>,
    pub is_default: bool,
    pub created_at: i64,
}

/// Address payload for create and full update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default = "default_label")]
    pub label: String,
    pub street: String,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub area: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_city")]
    pub emirate: String,
    pub landmark: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

fn default_label() -> String {
    "Home".to_string()
}

fn default_city() -> String {
    "Dubai".to_string()
}

/// Address snapshot embedded in an order
///
/// Copied at checkout so later edits to the saved address never rewrite
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    #[serde(default = "default_label")]
    pub label: String,
    pub street: String,
    pub building: Option<String>,
    pub apartment: Option<String>,
    pub area: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_city")]
    pub emirate: String,
    pub landmark: Option<String>,
}

impl From<&Address> for DeliveryAddress {
    fn from(a: &Address) -> Self {
        Self {
            label: a.label.clone(),
            street: a.street.clone(),
            building: a.building.clone(),
            apartment: a.apartment.clone(),
            area: a.area.clone(),
            city: a.city.clone(),
            emirate: a.emirate.clone(),
            landmark: a.landmark.clone(),
        }
    }
}

impl From<&AddressInput> for DeliveryAddress {
    fn from(a: &AddressInput) -> Self {
        let trimmed = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            label: a.label.trim().to_string(),
            street: a.street.trim().to_string(),
            building: trimmed(&a.building),
            apartment: trimmed(&a.apartment),
            area: a.area.trim().to_string(),
            city: a.city.trim().to_string(),
            emirate: a.emirate.trim().to_string(),
            landmark: trimmed(&a.landmark),
        }
    }
}

impl From<&DeliveryAddress> for AddressInput {
    fn from(a: &DeliveryAddress) -> Self {
        Self {
            label: a.label.clone(),
            street: a.street.clone(),
            building: a.building.clone(),
            apartment: a.apartment.clone(),
            area: a.area.clone(),
            city: a.city.clone(),
            emirate: a.emirate.clone(),
            landmark: a.landmark.clone(),
            is_default: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_defaults_to_dubai_home() {
        let input: AddressInput =
            serde_json::from_str(r#"{"street":"Sheikh Zayed Rd","area":"Al Barsha"}"#).unwrap();
        assert_eq!(input.label, "Home");
        assert_eq!(input.city, "Dubai");
        assert_eq!(input.emirate, "Dubai");
        assert!(!input.is_default);
    }

    #[test]
    fn snapshot_from_saved_address() {
        let saved = Address {
            id: 1,
            user_id: 2,
            label: "Work".into(),
            street: "Marina Walk".into(),
            building: Some("Tower 3".into()),
            apartment: None,
            area: "Dubai Marina".into(),
            city: "Dubai".into(),
            emirate: "Dubai".into(),
            landmark: None,
            is_default: true,
            created_at: 0,
        };
        let snap = DeliveryAddress::from(&saved);
        assert_eq!(snap.label, "Work");
        assert_eq!(snap.building.as_deref(), Some("Tower 3"));
    }
}
