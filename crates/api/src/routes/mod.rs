//! HTTP route handlers for the customer API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                           - Liveness check
//! GET   /health/ready                     - Readiness check (DB ping)
//!
//! # Accounts
//! POST  /api/accounts/send-otp            - Issue an OTP to a mobile number
//! POST  /api/accounts/verify-otp          - Verify OTP, resolve user, return token
//! POST  /api/accounts/customer/set-name   - Set display name (requires auth)
//!
//! # Cart
//! POST  /api/cart/add                     - Add an item to the active cart (requires auth)
//!
//! # Orders
//! POST  /api/order/place                  - Convert active cart to an order (requires auth)
//! PATCH /api/order/{id}/status            - Change fulfilment status
//! PATCH /api/order/{id}/payment-status    - Change payment status
//! ```

pub mod accounts;
pub mod cart;
pub mod orders;

use axum::{
    Router,
    routing::{patch, post},
};

use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(accounts::send_otp))
        .route("/verify-otp", post(accounts::verify_otp))
        .route("/customer/set-name", post(accounts::set_name))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/add", post(cart::add))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/place", post(orders::place))
        .route("/{id}/status", patch(orders::set_status))
        .route("/{id}/payment-status", patch(orders::set_payment_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/accounts", account_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/order", order_routes())
}
