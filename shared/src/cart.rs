//! Shopping cart
//!
//! A plain value owned by the client. The server never stores carts; it
//! re-prices them on quote and checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CheckoutLine, Product};
use crate::order::money::{line_total, round, to_decimal};

/// Product data the cart keeps for display and subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub image_url: Option<String>,
    pub unit: String,
}

impl CartProduct {
    pub fn unit_price(&self) -> Decimal {
        to_decimal(self.sale_price.unwrap_or(self.price))
    }
}

impl From<&Product> for CartProduct {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            sale_price: p.sale_price,
            image_url: p.image_url.clone(),
            unit: p.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a product, merging with an existing line.
    /// Non-positive quantities are ignored; the merged count saturates.
    pub fn add_item(&mut self, product: CartProduct, quantity: i64) {
        if quantity <= 0 {
            return;
        }
        match self.items.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.product = product;
            }
            None => self.items.push(CartLine { product, quantity }),
        }
    }

    pub fn remove_item(&mut self, product_id: i64) {
        self.items.retain(|l| l.product.id != product_id);
    }

    /// Set a line's quantity; zero or less removes it
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total units across all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().fold(0i64, |n, l| n.saturating_add(l.quantity))
    }

    /// Σ effective price × quantity
    pub fn subtotal(&self) -> Decimal {
        round(
            self.items
                .iter()
                .map(|l| line_total(l.product.unit_price(), l.quantity))
                .sum(),
        )
    }

    /// What gets sent to quote/checkout
    pub fn to_checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|l| CheckoutLine {
                product_id: l.product.id,
                quantity: l.quantity,
            })
            .collect()
    }
}

// ==================== Quote ====================

/// `POST /api/cart/quote` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CheckoutLine>,
}

/// Why a line cannot be ordered as is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineIssue {
    /// Product missing or inactive
    Unavailable,
    /// Fewer units on hand than requested
    InsufficientStock,
}

/// A re-priced line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: i64,
    /// None when the product no longer exists
    pub product: Option<CartProduct>,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
    pub available: i64,
    pub issue: Option<LineIssue>,
}

/// Cart priced against the live catalog
///
/// Lines with an issue are listed but excluded from the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartQuote {
    pub lines: Vec<QuoteLine>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
    /// True when every line can be ordered
    pub orderable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::money::to_f64;

    fn product(id: i64, price: f64, sale_price: Option<f64>) -> CartProduct {
        CartProduct {
            id,
            name: format!("p{id}"),
            price,
            sale_price,
            image_url: None,
            unit: "piece".into(),
        }
    }

    #[test]
    fn subtotal_uses_sale_price() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10.0, Some(8.5)), 2);
        cart.add_item(product(2, 4.25, None), 3);
        assert_eq!(to_f64(cart.subtotal()), 29.75);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn add_merges_lines() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 10.0, None), 1);
        cart.add_item(product(1, 10.0, None), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);

        cart.add_item(product(1, 10.0, None), 0);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn add_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1.0, None), i64::MAX);
        cart.add_item(product(1, 1.0, None), 1);
        assert_eq!(cart.items()[0].quantity, i64::MAX);
    }

    #[test]
    fn update_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1.0, None), 1);
        cart.add_item(product(2, 2.0, None), 1);

        cart.update_quantity(1, 4);
        assert_eq!(cart.item_count(), 5);

        cart.update_quantity(1, 0);
        assert_eq!(cart.items().len(), 1);

        cart.update_quantity(99, 3);
        assert_eq!(cart.item_count(), 1);

        cart.remove_item(2);
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(product(1, 1.0, None), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn checkout_lines_carry_no_prices() {
        let mut cart = Cart::new();
        cart.add_item(product(5, 3.0, None), 2);
        assert_eq!(
            cart.to_checkout_lines(),
            vec![CheckoutLine {
                product_id: 5,
                quantity: 2
            }]
        );
    }
}
