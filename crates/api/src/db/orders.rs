//! Order repository.
//!
//! Placement converts the caller's active cart into an order inside a single
//! transaction, locking the cart row so two concurrent placements cannot
//! both consume it. Status changes are compare-and-swap updates; the service
//! layer owns the transition tables and this layer only guarantees that the
//! observed source state still held when the write landed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use hello_laundry_core::{
    ItemPriceId, LaundryId, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, UserId, price,
};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    laundry_id: i32,
    status: String,
    payment_status: String,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let payment_status: PaymentStatus = self.payment_status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            laundry_id: LaundryId::new(self.laundry_id),
            status,
            payment_status,
            total_price: Price::new(self.total_price),
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    item_price_id: i32,
    item_name: String,
    quantity: i32,
    price: Decimal,
}

impl OrderLineRow {
    fn into_line(self) -> Result<OrderLine, RepositoryError> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order_item {}",
                self.quantity, self.id
            ))
        })?;

        Ok(OrderLine {
            id: OrderItemId::new(self.id),
            item_price_id: ItemPriceId::new(self.item_price_id),
            item_name: self.item_name,
            quantity,
            price: Price::new(self.price),
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartLineSource {
    item_price_id: i32,
    quantity: i32,
    price: Decimal,
}

const ORDER_COLUMNS: &str =
    "id, user_id, laundry_id, status, payment_status, total_price, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the user's active cart into a pending order.
    ///
    /// One transaction end to end: lock the cart, snapshot every line's
    /// current catalog price into `order_item`, total them, and deactivate
    /// the cart. If the user somehow holds several active carts the most
    /// recently created one wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no active cart or
    /// the cart holds no lines.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn place_order(
        &self,
        user_id: UserId,
    ) -> Result<(Order, Vec<OrderLine>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        #[derive(sqlx::FromRow)]
        struct ActiveCart {
            id: i32,
            laundry_id: i32,
        }

        let cart: Option<ActiveCart> = sqlx::query_as(
            "SELECT id, laundry_id FROM cart \
             WHERE user_id = $1 AND is_active \
             ORDER BY created_at DESC, id DESC LIMIT 1 \
             FOR UPDATE",
        )
        .bind(user_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(cart) = cart else {
            return Err(RepositoryError::NotFound);
        };

        let sources: Vec<CartLineSource> = sqlx::query_as(
            "SELECT ci.item_price_id, ci.quantity, ip.price \
             FROM cart_item ci \
             JOIN item_price ip ON ip.id = ci.item_price_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.id",
        )
        .bind(cart.id)
        .fetch_all(&mut *tx)
        .await?;

        if sources.is_empty() {
            return Err(RepositoryError::NotFound);
        }

        let order_row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO laundry_order (user_id, laundry_id, status, payment_status, total_price) \
             VALUES ($1, $2, $3, $4, 0) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(cart.laundry_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for source in &sources {
            sqlx::query(
                "INSERT INTO order_item (order_id, item_price_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_row.id)
            .bind(source.item_price_id)
            .bind(source.quantity)
            .bind(source.price)
            .execute(&mut *tx)
            .await?;
        }

        let total = price::lines_total(sources.iter().map(|s| {
            (
                Price::new(s.price),
                u32::try_from(s.quantity).unwrap_or_default(),
            )
        }));

        sqlx::query("UPDATE laundry_order SET total_price = $2 WHERE id = $1")
            .bind(order_row.id)
            .bind(total.amount())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE cart SET is_active = FALSE WHERE id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;

        let lines = Self::fetch_lines(&mut tx, order_row.id).await?;
        tx.commit().await?;

        let mut order = order_row.into_order()?;
        order.total_price = total;

        Ok((order, lines))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM laundry_order WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Lines belonging to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_lines(&mut conn, id.as_i32()).await
    }

    /// Move an order from `from` to `to`, only if it is still in `from`.
    ///
    /// Returns the updated order, or `None` when the swap lost (the order is
    /// gone or something else changed its status first). The caller decides
    /// whether the transition was legal to begin with.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn swap_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE laundry_order SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Move an order's payment state, only if it is still in `from`.
    ///
    /// Same compare-and-swap contract as [`Self::swap_status`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is invalid.
    pub async fn swap_payment_status(
        &self,
        id: OrderId,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE laundry_order SET payment_status = $3 \
             WHERE id = $1 AND payment_status = $2 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    async fn fetch_lines(
        conn: &mut PgConnection,
        order_id: i32,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT oi.id, oi.item_price_id, i.name AS item_name, oi.quantity, oi.price \
             FROM order_item oi \
             JOIN item_price ip ON ip.id = oi.item_price_id \
             JOIN item i ON i.id = ip.item_id \
             WHERE oi.order_id = $1 \
             ORDER BY oi.id",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(OrderLineRow::into_line).collect()
    }
}
