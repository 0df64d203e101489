//! Session auth route handlers.
//!
//! Sign-in happens upstream; the storefront only reports who is signed in
//! and handles logout.

use axum::{Json, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::SessionCart;
use crate::error::{Result, clear_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user};
use crate::models::{CurrentUser, session_keys};

/// Who is signed in, if anyone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub is_authenticated: bool,
    pub user: Option<CurrentUser>,
}

/// Report the signed-in user.
pub async fn me(OptionalAuth(user): OptionalAuth) -> Json<MeResponse> {
    Json(MeResponse {
        is_authenticated: user.is_some(),
        user,
    })
}

/// Handle logout.
///
/// Empties the cart and erases the user's saved cart, drops checkout
/// progress, and rotates the session ID. The wishlist is kept for the next
/// sign-in.
#[instrument(skip_all)]
pub async fn logout(session: Session, mut cart: SessionCart) -> Result<StatusCode> {
    cart.sign_out().await?;

    session
        .remove_value(session_keys::CHECKOUT)
        .await?;
    clear_current_user(&session).await?;

    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to cycle session id");
    }

    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
