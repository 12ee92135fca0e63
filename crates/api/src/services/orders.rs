//! Order placement and lifecycle service.
//!
//! The transition tables live on the status types in the core crate; this
//! service reads the order, consults the table, and applies the change with
//! a compare-and-swap so a concurrent transition cannot be overwritten.

use sqlx::PgPool;
use thiserror::Error;

use hello_laundry_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::models::{Order, OrderLine};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The user has no active cart with items to place an order from.
    #[error("no active cart to place an order from")]
    NoActiveCart,

    /// The order doesn't exist.
    #[error("order not found")]
    OrderNotFound,

    /// The requested status change is not allowed from the current state.
    #[error("cannot change status from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Convert the caller's active cart into a pending order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoActiveCart` if there is no active cart or it
    /// holds no items.
    /// Returns `OrderError::Repository` for database errors.
    pub async fn place(&self, user_id: UserId) -> Result<(Order, Vec<OrderLine>), OrderError> {
        self.orders.place_order(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => OrderError::NoActiveCart,
            other => OrderError::Repository(other),
        })
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::Repository` for database errors.
    pub async fn get(&self, id: OrderId) -> Result<(Order, Vec<OrderLine>), OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
        let lines = self.orders.lines(id).await?;
        Ok((order, lines))
    }

    /// Change an order's fulfilment status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::InvalidTransition` if the change is not allowed
    /// from the order's current status, including when a concurrent update
    /// moved it first.
    /// Returns `OrderError::Repository` for database errors.
    pub async fn set_status(&self, id: OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;

        if !order.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: order.status.as_str(),
                to: to.as_str(),
            });
        }

        match self.orders.swap_status(id, order.status, to).await? {
            Some(updated) => Ok(updated),
            // The swap lost; report against whatever state won.
            None => {
                let current = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
                Err(OrderError::InvalidTransition {
                    from: current.status.as_str(),
                    to: to.as_str(),
                })
            }
        }
    }

    /// Change an order's payment status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::InvalidTransition` if the change is not allowed
    /// from the order's current payment status.
    /// Returns `OrderError::Repository` for database errors.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        to: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;

        if !order.payment_status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: order.payment_status.as_str(),
                to: to.as_str(),
            });
        }

        match self.orders.swap_payment_status(id, order.payment_status, to).await? {
            Some(updated) => Ok(updated),
            None => {
                let current = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
                Err(OrderError::InvalidTransition {
                    from: current.payment_status.as_str(),
                    to: to.as_str(),
                })
            }
        }
    }
}
