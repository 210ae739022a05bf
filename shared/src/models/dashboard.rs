//! Admin dashboard figures

use serde::{Deserialize, Serialize};

use super::Order;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub total_products: i64,
    pub active_products: i64,
    pub total_customers: i64,
    /// Sum of totals of delivered orders
    pub total_revenue: f64,
    /// Orders placed since local midnight
    pub today_orders: i64,
    pub today_revenue: f64,
    pub recent_orders: Vec<Order>,
}
