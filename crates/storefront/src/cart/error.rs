//! Cart operation errors.

use mercato_core::ProductId;
use thiserror::Error;

use super::lookup::LookupError;
use super::mirror::MirrorError;

/// Errors returned by [`super::CartContainer`] operations.
///
/// Stale line IDs are not errors; quantity updates and removals on unknown
/// lines succeed without changing anything.
#[derive(Debug, Error)]
pub enum CartError {
    /// The caller is signed out.
    #[error("sign in to use the cart")]
    Unauthenticated,

    /// The product could not be resolved, so nothing was added.
    #[error("could not add product {product_id}: {source}")]
    ProductLookupFailed {
        product_id: ProductId,
        #[source]
        source: LookupError,
    },

    /// Lines are added with at least one unit.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The authentication status source closed before resolving.
    #[error("authentication status unavailable")]
    AuthUnavailable,

    /// Reading or writing the persisted mirror failed.
    #[error("cart storage error: {0}")]
    Mirror(#[from] MirrorError),
}

impl CartError {
    /// Whether the failed lookup was a missing product rather than an outage.
    #[must_use]
    pub const fn is_product_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProductLookupFailed {
                source: LookupError::NotFound(_),
                ..
            }
        )
    }
}
