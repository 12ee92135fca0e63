//! Cart repository.
//!
//! Two invariants live here, both enforced in SQL so concurrent requests
//! cannot corrupt them:
//!
//! - at most one active cart per `(user, laundry)`, via a partial unique
//!   index and `ON CONFLICT ... DO NOTHING`
//! - one line per `(cart, item_price)`, via `ON CONFLICT ... DO UPDATE SET
//!   quantity = quantity + EXCLUDED.quantity` (no read-modify-write window)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use hello_laundry_core::{CartId, CartItemId, ItemPriceId, LaundryId, Price, UserId};

use super::RepositoryError;
use crate::models::{CartLine, CartSnapshot};

#[derive(sqlx::FromRow)]
struct CartHeaderRow {
    id: i32,
    laundry_id: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    item_price_id: i32,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on cart_item {}",
                self.quantity, self.id
            ))
        })?;

        Ok(CartLine {
            id: CartItemId::new(self.id),
            item_price_id: ItemPriceId::new(self.item_price_id),
            item_name: self.item_name,
            quantity,
            unit_price: Price::new(self.unit_price),
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of an item to the user's active cart for a laundry.
    ///
    /// Runs as one transaction: validate the item price belongs to the
    /// laundry, find or create the active cart, merge the line, and read
    /// back the full snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item price does not exist
    /// under this laundry.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        user_id: UserId,
        laundry_id: LaundryId,
        item_price_id: ItemPriceId,
        quantity: i32,
    ) -> Result<CartSnapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let listed: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM item_price WHERE id = $1 AND laundry_id = $2")
                .bind(item_price_id.as_i32())
                .bind(laundry_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if listed.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let cart_id = Self::find_or_create_active(&mut tx, user_id, laundry_id).await?;

        sqlx::query(
            "INSERT INTO cart_item (cart_id, item_price_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, item_price_id) \
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(item_price_id.as_i32())
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        let snapshot = Self::fetch_snapshot(&mut tx, cart_id).await?;
        tx.commit().await?;

        Ok(snapshot)
    }

    /// Find the active cart for `(user, laundry)`, creating one if absent.
    ///
    /// The insert conflicts against the partial unique index on active
    /// carts; when another request created the cart first, the follow-up
    /// select sees it once that transaction commits.
    async fn find_or_create_active(
        conn: &mut PgConnection,
        user_id: UserId,
        laundry_id: LaundryId,
    ) -> Result<i32, RepositoryError> {
        let inserted: Option<i32> = sqlx::query_scalar(
            "INSERT INTO cart (user_id, laundry_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, laundry_id) WHERE is_active DO NOTHING \
             RETURNING id",
        )
        .bind(user_id.as_i32())
        .bind(laundry_id.as_i32())
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(id) = inserted {
            return Ok(id);
        }

        let existing: i32 = sqlx::query_scalar(
            "SELECT id FROM cart WHERE user_id = $1 AND laundry_id = $2 AND is_active",
        )
        .bind(user_id.as_i32())
        .bind(laundry_id.as_i32())
        .fetch_one(&mut *conn)
        .await?;

        Ok(existing)
    }

    async fn fetch_snapshot(
        conn: &mut PgConnection,
        cart_id: i32,
    ) -> Result<CartSnapshot, RepositoryError> {
        let header: CartHeaderRow = sqlx::query_as(
            "SELECT id, laundry_id, is_active, created_at FROM cart WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_one(&mut *conn)
        .await?;

        let rows: Vec<CartLineRow> = sqlx::query_as(
            "SELECT ci.id, ci.item_price_id, i.name AS item_name, ci.quantity, \
                    ip.price AS unit_price \
             FROM cart_item ci \
             JOIN item_price ip ON ip.id = ci.item_price_id \
             JOIN item i ON i.id = ip.item_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.id",
        )
        .bind(cart_id)
        .fetch_all(&mut *conn)
        .await?;

        let items = rows
            .into_iter()
            .map(CartLineRow::into_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CartSnapshot::new(
            CartId::new(header.id),
            LaundryId::new(header.laundry_id),
            header.is_active,
            header.created_at,
            items,
        ))
    }
}
