//! Cart effects: authentication gating, product lookup, and persistence.
//!
//! The pure cart model lives in `mercato_core::cart`. This module wraps it in
//! a [`CartContainer`] that talks to the outside world through three
//! collaborators:
//!
//! - an authentication status channel ([`AuthStatus`] over `tokio::sync::watch`)
//! - a [`ProductLookup`] that resolves product display data
//! - a [`CartMirror`] holding one persisted slot per user

mod container;
mod error;
mod extract;
mod lookup;
mod mirror;

pub use container::{AddLine, CartContainer, CartView};
pub use error::CartError;
pub use extract::{SessionCart, StorefrontCart};
pub use lookup::{LookupError, ProductLookup};
pub use mirror::{CartMirror, MemoryMirror, MirrorError, MirrorKey, SessionMirror};

use mercato_core::UserId;

/// Authentication status as seen by the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStatus {
    /// Not yet known. Cart operations wait until it resolves.
    #[default]
    Pending,
    Unauthenticated,
    Authenticated(UserId),
}

impl AuthStatus {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Authenticated(user_id) => Some(*user_id),
            Self::Pending | Self::Unauthenticated => None,
        }
    }
}

impl From<Option<UserId>> for AuthStatus {
    fn from(user_id: Option<UserId>) -> Self {
        user_id.map_or(Self::Unauthenticated, Self::Authenticated)
    }
}
