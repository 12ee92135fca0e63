//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hello_laundry_core::{
    ItemPriceId, LaundryId, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, UserId,
};

/// A placed order.
///
/// Snapshotted from a cart at placement; only `status`, `payment_status`,
/// and `total_price` are mutable afterwards, and the first two only through
/// the transition tables in `hello_laundry_core`.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub laundry_id: LaundryId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
}

/// An immutable order line.
///
/// `price` is copied from the catalog at order-creation time; later catalog
/// changes never touch it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderItemId,
    pub item_price_id: ItemPriceId,
    pub item_name: String,
    pub quantity: u32,
    pub price: Price,
}
