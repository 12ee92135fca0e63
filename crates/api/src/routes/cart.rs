//! Cart route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use hello_laundry_core::{ItemPriceId, LaundryId};

use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAuth;
use crate::models::CartSnapshot;
use crate::services::CartService;
use crate::state::AppState;

/// Upper bound for a single add. Keeps merged line quantities far away
/// from the `INTEGER` column limit even across many requests.
const MAX_LINE_QUANTITY: i32 = 1_000;

/// Request body for `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub laundry_id: i32,
    pub item_price_id: i32,
    pub quantity: i32,
}

/// Response body for `POST /api/cart/add`.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: CartSnapshot,
}

/// Add an item to the caller's active cart for a laundry.
///
/// Creates the cart on first add; repeated adds of the same item price
/// merge into one line with a summed quantity.
#[instrument(skip(state, body), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    if !(1..=MAX_LINE_QUANTITY).contains(&body.quantity) {
        return Err(AppError::BadRequest(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }

    let cart = CartService::new(state.pool())
        .add_item(
            user.id,
            LaundryId::new(body.laundry_id),
            ItemPriceId::new(body.item_price_id),
            body.quantity,
        )
        .await?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}
