//! Session-related types.
//!
//! Identity is established by the sign-in flow in front of this service;
//! the storefront only reads the signed-in user from the session and clears
//! it on logout.

use mercato_core::UserId;
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Name shown in the storefront header.
    pub name: String,
}

/// Session keys.
///
/// Cart lines live under `cart_items:{user_id}`, see
/// [`MirrorKey`](crate::cart::MirrorKey).
pub mod keys {
    use mercato_core::UserId;

    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the checkout wizard's progress.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the most recent order confirmation.
    pub const LAST_ORDER: &str = "last_order";

    /// Key for a user's wishlist.
    #[must_use]
    pub fn wishlist(user_id: UserId) -> String {
        format!("wishlist:{user_id}")
    }
}
