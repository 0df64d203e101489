//! Product lookup collaborator.

use std::future::Future;

use mercato_core::ProductId;
use mercato_core::cart::ProductSnapshot;
use thiserror::Error;

/// Resolves a product ID to the display data a cart line snapshots.
///
/// The production implementation is [`crate::catalog::CatalogClient`].
pub trait ProductLookup: Send + Sync {
    /// Look up the current name, unit price, and primary image of a product.
    fn lookup(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<ProductSnapshot, LookupError>> + Send;
}

/// Why a product lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The catalog has no such product.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The catalog could not be reached or returned an unusable answer.
    #[error("product lookup unavailable: {0}")]
    Unavailable(String),
}
