//! Wishlist route handlers.
//!
//! The wishlist is an ordered set of product IDs kept in the session under
//! `wishlist:{user_id}`. All routes require a signed-in user.

use axum::{Json, extract::Path, http::StatusCode};
use mercato_core::wishlist::Wishlist;
use mercato_core::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::session_keys;

/// Wishlist JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub product_ids: Wishlist,
    pub count: usize,
}

impl From<Wishlist> for WishlistResponse {
    fn from(wishlist: Wishlist) -> Self {
        Self {
            count: wishlist.len(),
            product_ids: wishlist,
        }
    }
}

/// Add to wishlist request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load a user's wishlist. Unreadable data is discarded.
async fn load(session: &Session, user_id: UserId) -> Result<Wishlist> {
    let key = session_keys::wishlist(user_id);
    let Some(value) = session.get_value(&key).await? else {
        return Ok(Wishlist::new());
    };
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(%key, error = %e, "Discarding unreadable wishlist");
        Wishlist::new()
    }))
}

async fn save(session: &Session, user_id: UserId, wishlist: &Wishlist) -> Result<()> {
    session
        .insert(&session_keys::wishlist(user_id), wishlist)
        .await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// List wishlist product IDs.
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn show(
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<WishlistResponse>> {
    Ok(Json(load(&session, user.id).await?.into()))
}

/// Add a product. Adding one already present changes nothing.
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn add(
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<AddToWishlistRequest>,
) -> Result<(StatusCode, Json<WishlistResponse>)> {
    let mut wishlist = load(&session, user.id).await?;
    let status = if wishlist.add(request.product_id) {
        save(&session, user.id, &wishlist).await?;
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(wishlist.into())))
}

/// Remove a product. Removing one that is absent changes nothing.
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn remove(
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<WishlistResponse>> {
    let mut wishlist = load(&session, user.id).await?;
    if wishlist.remove(&product_id) {
        save(&session, user.id, &wishlist).await?;
    }
    Ok(Json(wishlist.into()))
}
