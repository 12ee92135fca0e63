//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hello_laundry_core::{CartId, CartItemId, ItemPriceId, LaundryId, Price, price};

/// One merged line in a cart.
///
/// Uniqueness is per `(cart, item_price)`; repeated adds increment
/// `quantity` instead of creating new rows. `unit_price` is the current
/// catalog price - it is not fixed until the cart becomes an order.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub item_price_id: ItemPriceId,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartLine {
    /// Line subtotal at the current catalog price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.subtotal(self.quantity)
    }
}

/// Full state of a cart, returned after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    pub id: CartId,
    pub laundry_id: LaundryId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartLine>,
    /// Computed on read from the line items, never cached.
    pub total_price: Price,
}

impl CartSnapshot {
    /// Assemble a snapshot, computing the total from the lines.
    #[must_use]
    pub fn new(
        id: CartId,
        laundry_id: LaundryId,
        is_active: bool,
        created_at: DateTime<Utc>,
        items: Vec<CartLine>,
    ) -> Self {
        let total_price = price::lines_total(
            items
                .iter()
                .map(|line| (line.unit_price, line.quantity)),
        );
        Self {
            id,
            laundry_id,
            is_active,
            created_at,
            items,
            total_price,
        }
    }
}
