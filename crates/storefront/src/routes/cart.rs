//! Cart route handlers.
//!
//! Every handler receives a [`SessionCart`] that has already been synced with
//! the session's signed-in user. Mutations answer with the updated cart.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use mercato_core::{CurrencyCode, LineId, Price};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::{AddLine, CartView, SessionCart, StorefrontCart};
use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Cart JSON: the cart view plus a formatted subtotal.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse<'a> {
    #[serde(flatten)]
    pub cart: CartView<'a>,
    pub subtotal_display: String,
}

impl<'a> CartResponse<'a> {
    #[must_use]
    pub fn new(cart: &'a StorefrontCart, currency: CurrencyCode) -> Self {
        let view = cart.view();
        let subtotal_display = Price::new(view.subtotal, currency).display();
        Self {
            cart: view,
            subtotal_display,
        }
    }
}

fn cart_response(state: &AppState, cart: &StorefrontCart) -> Response {
    Json(CartResponse::new(cart, state.config().checkout.currency)).into_response()
}

/// Set quantity request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Show the cart.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, cart: SessionCart) -> Response {
    cart_response(&state, &cart)
}

/// Add a product to the cart.
#[instrument(skip(state, cart))]
pub async fn add_line(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Json(request): Json<AddLine>,
) -> Result<Response> {
    let product_id = request.product_id.clone();
    cart.add_line(request).await?;
    add_breadcrumb(
        "cart",
        "Added line",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(cart_response(&state, &cart))
}

/// Change a line's quantity.
#[instrument(skip(state, cart))]
pub async fn set_quantity(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Path(line_id): Path<LineId>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Response> {
    cart.set_quantity(&line_id, request.quantity).await?;
    Ok(cart_response(&state, &cart))
}

/// Remove a line.
#[instrument(skip(state, cart))]
pub async fn remove_line(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Path(line_id): Path<LineId>,
) -> Result<Response> {
    cart.remove_line(&line_id).await?;
    Ok(cart_response(&state, &cart))
}

/// Empty the cart.
#[instrument(skip(state, cart))]
pub async fn clear(State(state): State<AppState>, mut cart: SessionCart) -> Result<Response> {
    cart.clear().await?;
    Ok(cart_response(&state, &cart))
}
