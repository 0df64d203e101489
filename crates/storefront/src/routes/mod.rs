//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Liveness check
//! GET    /health/ready               - Readiness check (session database)
//!
//! # Cart (requires sign-in for mutations)
//! GET    /api/cart                   - Cart lines and totals
//! DELETE /api/cart                   - Empty the cart
//! POST   /api/cart/lines             - Add a product
//! PATCH  /api/cart/lines/{line_id}   - Set a line's quantity
//! DELETE /api/cart/lines/{line_id}   - Remove a line
//!
//! # Wishlist (requires sign-in)
//! GET    /api/wishlist               - Saved product IDs
//! POST   /api/wishlist               - Save a product
//! DELETE /api/wishlist/{product_id}  - Forget a product
//!
//! # Checkout (requires sign-in)
//! GET    /api/checkout               - Wizard state and order summary
//! POST   /api/checkout/shipping      - Submit shipping address
//! POST   /api/checkout/payment       - Submit card
//! POST   /api/checkout/back          - Previous step
//! POST   /api/checkout/edit          - Jump back to a step
//! POST   /api/checkout/place         - Place the order
//! GET    /api/checkout/confirmation  - Last placed order
//!
//! # Auth
//! GET    /auth/me                    - Signed-in user
//! POST   /auth/logout                - Logout
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/lines", post(cart::add_line))
        .route(
            "/lines/{line_id}",
            patch(cart::set_quantity).delete(cart::remove_line),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).post(wishlist::add))
        .route("/{product_id}", delete(wishlist::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/payment", post(checkout::submit_payment))
        .route("/back", post(checkout::back))
        .route("/edit", post(checkout::edit))
        .route("/place", post(checkout::place_order))
        .route("/confirmation", get(checkout::confirmation))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
///
/// Rate limiting is layered on in `main` so the router can be driven
/// directly in tests.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/api", api_routes())
        .nest("/auth", auth_routes())
}
