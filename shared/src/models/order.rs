//! Order Models (persisted orders, items, audit trail, checkout payloads)

use serde::{Deserialize, Serialize};

use super::{AddressInput, DeliveryAddress, Role};
use crate::order::{OrderStatus, PaymentMethod, PaymentStatus};

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human-facing number (`EG…`)
    pub order_number: String,
    /// None for guest checkout
    pub user_id: Option<i64>,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub discount: f64,
    pub total: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub rider_id: Option<i64>,
    pub estimated_delivery: Option<i64>,
    pub delivered_at: Option<i64>,
    /// Incremented on every mutation
    pub version: i64,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub idempotency_key: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line, with product data copied at checkout time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// Cleared if the product is later deleted
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_image: Option<String>,
    pub unit_price: f64,
    pub quantity: i64,
    pub total_price: f64,
    pub created_at: i64,
}

/// One row of the status audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatusChange {
    pub id: i64,
    pub order_id: i64,
    /// None for the creation entry
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    /// None for guest checkout
    pub actor_id: Option<i64>,
    pub actor_role: Option<Role>,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Order with its lines and history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub history: Vec<OrderStatusChange>,
}

// ==================== Checkout ====================

/// One requested line: product and quantity only; prices come from the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Contact details captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
}

/// Checkout payload
///
/// Exactly one of `address_id` (a saved address of the caller) or
/// `address` (a new one) must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
    pub customer: CustomerContact,
    pub address_id: Option<i64>,
    pub address: Option<AddressInput>,
    /// Save a new address to the caller's address book (signed-in only)
    #[serde(default = "default_true")]
    pub save_address: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Replaying the same key returns the order created the first time
    pub idempotency_key: Option<String>,
}

fn default_true() -> bool {
    true
}

// ==================== Fulfilment ====================

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    /// Reject with a conflict if the order moved on since the client read it
    pub expected_version: Option<i64>,
    pub note: Option<String>,
}

/// Admin rider assignment (`rider_id: null` unassigns)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderAssignment {
    pub rider_id: Option<i64>,
    pub expected_version: Option<i64>,
}

/// Rider app listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderOrders {
    /// Confirmed or preparing orders that are free or already mine
    pub available: Vec<Order>,
    /// My orders out for delivery
    pub mine: Vec<Order>,
}
