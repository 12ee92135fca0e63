//! Cart service.

use sqlx::PgPool;
use thiserror::Error;

use hello_laundry_core::{ItemPriceId, LaundryId, UserId};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::models::CartSnapshot;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The item price doesn't exist, or is listed under a different laundry.
    #[error("item price not found")]
    ItemPriceNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
        }
    }

    /// Add an item to the caller's active cart for a laundry.
    ///
    /// Creates the cart on first use. Adding an item already in the cart
    /// increases its quantity instead of duplicating the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemPriceNotFound` if the item price isn't listed
    /// under this laundry.
    /// Returns `CartError::Repository` for database errors.
    ///
    /// `quantity` is bounds-checked by the route before it gets here; the
    /// `quantity >= 1` table constraint backstops other callers.
    pub async fn add_item(
        &self,
        user_id: UserId,
        laundry_id: LaundryId,
        item_price_id: ItemPriceId,
        quantity: i32,
    ) -> Result<CartSnapshot, CartError> {
        self.carts
            .add_item(user_id, laundry_id, item_price_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::ItemPriceNotFound,
                other => CartError::Repository(other),
            })
    }
}
