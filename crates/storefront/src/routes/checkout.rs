//! Checkout route handlers.
//!
//! The wizard lives in the session under `checkout`. Every handler requires a
//! signed-in user and answers with the wizard's current state plus totals for
//! the cart as it stands.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use mercato_core::checkout::{
    CheckoutStep, CheckoutWizard, OrderConfirmation, OrderSummary, PaymentDetails,
    PaymentMethod, ShippingDetails,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartError, SessionCart};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Checkout JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse<'a> {
    pub step: CheckoutStep,
    pub shipping: Option<&'a ShippingDetails>,
    pub payment: Option<&'a PaymentMethod>,
    pub summary: OrderSummary,
}

/// Edit step request body.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub step: CheckoutStep,
}

fn checkout_response(state: &AppState, wizard: &CheckoutWizard, cart: &SessionCart) -> Response {
    let checkout = state.config().checkout;
    Json(CheckoutResponse {
        step: wizard.step(),
        shipping: wizard.shipping(),
        payment: wizard.payment(),
        summary: OrderSummary::from_cart(cart.state(), checkout.tax_rate, checkout.currency),
    })
    .into_response()
}

// =============================================================================
// Session Helpers
// =============================================================================

fn require_signed_in(cart: &SessionCart) -> Result<()> {
    if cart.is_authenticated() {
        Ok(())
    } else {
        Err(CartError::Unauthenticated.into())
    }
}

/// Load the wizard. Unreadable data restarts checkout.
async fn load_wizard(session: &Session) -> Result<CheckoutWizard> {
    let Some(value) = session.get_value(session_keys::CHECKOUT).await? else {
        return Ok(CheckoutWizard::new());
    };
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Discarding unreadable checkout state");
        CheckoutWizard::new()
    }))
}

async fn save_wizard(session: &Session, wizard: &CheckoutWizard) -> Result<()> {
    session.insert(session_keys::CHECKOUT, wizard).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Show checkout progress and totals.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
) -> Result<Response> {
    require_signed_in(&cart)?;
    let wizard = load_wizard(&session).await?;
    Ok(checkout_response(&state, &wizard, &cart))
}

/// Submit the shipping address.
#[instrument(skip_all)]
pub async fn submit_shipping(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
    Json(details): Json<ShippingDetails>,
) -> Result<Response> {
    require_signed_in(&cart)?;
    let mut wizard = load_wizard(&session).await?;
    wizard.submit_shipping(details)?;
    save_wizard(&session, &wizard).await?;
    Ok(checkout_response(&state, &wizard, &cart))
}

/// Submit the card. Only the masked payment method is stored.
#[instrument(skip_all)]
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
    Json(details): Json<PaymentDetails>,
) -> Result<Response> {
    require_signed_in(&cart)?;
    let mut wizard = load_wizard(&session).await?;
    wizard.submit_payment(&details, Utc::now().date_naive())?;
    save_wizard(&session, &wizard).await?;
    Ok(checkout_response(&state, &wizard, &cart))
}

/// Step back one step.
#[instrument(skip_all)]
pub async fn back(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
) -> Result<Response> {
    require_signed_in(&cart)?;
    let mut wizard = load_wizard(&session).await?;
    wizard.back();
    save_wizard(&session, &wizard).await?;
    Ok(checkout_response(&state, &wizard, &cart))
}

/// Return to an earlier step from the review page.
#[instrument(skip_all)]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    cart: SessionCart,
    Json(request): Json<EditRequest>,
) -> Result<Response> {
    require_signed_in(&cart)?;
    let mut wizard = load_wizard(&session).await?;
    wizard.edit(request.step)?;
    save_wizard(&session, &wizard).await?;
    Ok(checkout_response(&state, &wizard, &cart))
}

/// Place the order.
///
/// Builds the confirmation, empties the cart, restarts the wizard, and keeps
/// the confirmation in the session for the confirmation page.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    mut cart: SessionCart,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    require_signed_in(&cart)?;
    let mut wizard = load_wizard(&session).await?;
    let checkout = state.config().checkout;

    let confirmation = OrderConfirmation::new(
        wizard.review()?,
        cart.state(),
        checkout.tax_rate,
        checkout.currency,
        Utc::now(),
    )?;

    cart.clear().await?;
    wizard.reset();
    save_wizard(&session, &wizard).await?;
    session
        .insert(session_keys::LAST_ORDER, &confirmation)
        .await?;

    tracing::info!(order_number = %confirmation.order_number, "Order placed");
    add_breadcrumb(
        "checkout",
        "Placed order",
        Some(&[("order_number", confirmation.order_number.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// The most recently placed order.
#[instrument(skip_all)]
pub async fn confirmation(
    session: Session,
    cart: SessionCart,
) -> Result<Json<OrderConfirmation>> {
    require_signed_in(&cart)?;
    session
        .get::<OrderConfirmation>(session_keys::LAST_ORDER)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No order has been placed".to_string()))
}
