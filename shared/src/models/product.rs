//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Category;
use crate::order::money::to_decimal;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: f64,
    /// Discounted price; wins over `price` when present
    pub sale_price: Option<f64>,
    pub image_url: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    #[serde(default)]
    pub images: Vec<String>,
    pub category_id: Option<i64>,
    pub stock_quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Free-form weight label ("500g", "1kg")
    pub weight: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

pub fn default_unit() -> String {
    "piece".to_string()
}

impl Product {
    /// Price charged per unit: sale price if set, otherwise the list price
    pub fn effective_price(&self) -> Decimal {
        to_decimal(self.sale_price.unwrap_or(self.price))
    }

    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some_and(|s| s < self.price)
    }

    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

/// Product with its (optional) category, for the product detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category_id: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub unit: Option<String>,
    pub weight: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Update product payload
///
/// `sale_price` uses a double option: absent leaves it untouched,
/// `null` clears the sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub description: Option<String>,
    pub description_ar: Option<String>,
    pub price: Option<f64>,
    #[serde(default, with = "double_option")]
    pub sale_price: Option<Option<f64>>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub category_id: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub unit: Option<String>,
    pub weight: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::money::to_f64;

    fn product(price: f64, sale_price: Option<f64>) -> Product {
        Product {
            id: 1,
            name: "Milk".to_string(),
            name_ar: None,
            description: None,
            description_ar: None,
            price,
            sale_price,
            image_url: None,
            images: vec![],
            category_id: None,
            stock_quantity: 5,
            unit: default_unit(),
            weight: None,
            is_active: true,
            is_featured: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn sale_price_wins() {
        assert_eq!(to_f64(product(12.5, Some(9.99)).effective_price()), 9.99);
        assert_eq!(to_f64(product(12.5, None).effective_price()), 12.5);
        assert!(product(12.5, Some(9.99)).is_on_sale());
        assert!(!product(12.5, None).is_on_sale());
    }

    #[test]
    fn stock_check() {
        let p = product(1.0, None);
        assert!(p.has_stock(5));
        assert!(!p.has_stock(6));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let u: ProductUpdate = serde_json::from_str(r#"{"price": 3.5}"#).unwrap();
        assert_eq!(u.sale_price, None);
        let u: ProductUpdate = serde_json::from_str(r#"{"sale_price": null}"#).unwrap();
        assert_eq!(u.sale_price, Some(None));
        let u: ProductUpdate = serde_json::from_str(r#"{"sale_price": 2.0}"#).unwrap();
        assert_eq!(u.sale_price, Some(Some(2.0)));
    }

    #[test]
    fn missing_unit_defaults_to_piece() {
        let json = r#"{"id":1,"name":"Eggs","name_ar":null,"description":null,
            "description_ar":null,"price":4.0,"sale_price":null,"image_url":null,
            "category_id":null,"stock_quantity":3,"weight":null,"is_active":true,
            "is_featured":false,"created_at":0,"updated_at":0}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.unit, "piece");
        assert!(p.images.is_empty());
    }
}
