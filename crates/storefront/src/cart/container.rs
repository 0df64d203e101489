//! The cart state container.
//!
//! [`CartContainer`] owns one [`CartState`] and is the only place cart
//! effects happen: it waits on the authentication status, resolves products
//! through a [`ProductLookup`], and keeps a [`CartMirror`] slot per user in
//! step with the in-memory state. All state transitions go through the pure
//! [`CartState::apply`] reducer.

use std::num::NonZeroU32;

use mercato_core::cart::{CartAction, CartLine, CartState};
use mercato_core::{Attributes, LineId, ProductId, UserId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::AuthStatus;
use super::error::CartError;
use super::lookup::ProductLookup;
use super::mirror::{CartMirror, MirrorError, MirrorKey};

/// Request to add a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLine {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub attributes: Attributes,
}

const fn default_quantity() -> u32 {
    1
}

impl AddLine {
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            variant_id: None,
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_variant(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }
}

/// The cart as the presentation layer sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView<'a> {
    pub lines: &'a [CartLine],
    pub item_count: u64,
    pub subtotal: Decimal,
    pub is_authenticated: bool,
}

/// Holds one cart and applies operations to it.
///
/// Every operation first waits for the authentication status to leave
/// [`AuthStatus::Pending`], then reconciles the cart with it:
///
/// - signing in loads that user's mirror slot
/// - signing out empties the cart and erases the signed-out user's slot
/// - switching users empties the cart and loads the new user's slot,
///   leaving the previous user's slot untouched
///
/// Mutations require a signed-in user and rewrite the mirror after the
/// in-memory state changes.
pub struct CartContainer<L, M> {
    lookup: L,
    mirror: M,
    auth: watch::Receiver<AuthStatus>,
    user: Option<UserId>,
    state: CartState,
}

impl<L, M> CartContainer<L, M>
where
    L: ProductLookup,
    M: CartMirror,
{
    /// Create an empty container. Nothing is loaded until the first operation
    /// or [`sync`](Self::sync).
    #[must_use]
    pub fn new(lookup: L, mirror: M, auth: watch::Receiver<AuthStatus>) -> Self {
        Self {
            lookup,
            mirror,
            auth,
            user: None,
            state: CartState::empty(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The user whose cart is loaded.
    #[must_use]
    pub const fn user(&self) -> Option<UserId> {
        self.user
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn view(&self) -> CartView<'_> {
        CartView {
            lines: self.state.lines(),
            item_count: self.state.item_count(),
            subtotal: self.state.subtotal(),
            is_authenticated: self.is_authenticated(),
        }
    }

    /// Bring the cart in line with the current authentication status.
    ///
    /// # Errors
    ///
    /// `AuthUnavailable` if the status source closes while pending, `Mirror`
    /// if the slot cannot be read or erased.
    #[instrument(skip(self))]
    pub async fn sync(&mut self) -> Result<(), CartError> {
        let resolved = self.resolve().await?;

        match (self.user, resolved) {
            (Some(current), Some(user)) if current == user => Ok(()),
            (previous, Some(user)) => {
                if let Some(previous) = previous {
                    info!(from = %previous, to = %user, "cart owner changed");
                }
                self.enter(user).await
            }
            (Some(previous), None) => self.leave(previous).await,
            (None, None) => {
                self.state = CartState::empty();
                Ok(())
            }
        }
    }

    /// Wait for the next authentication status change, then [`sync`](Self::sync).
    ///
    /// # Errors
    ///
    /// `AuthUnavailable` once the status source is gone, otherwise as `sync`.
    pub async fn changed(&mut self) -> Result<(), CartError> {
        self.auth
            .changed()
            .await
            .map_err(|_| CartError::AuthUnavailable)?;
        self.sync().await
    }

    /// Add a product, merging with an existing line that has the same
    /// product and attributes.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `InvalidQuantity` for zero, `ProductLookupFailed`
    /// when the product cannot be resolved (nothing is added), `Mirror` if
    /// the slot cannot be written.
    #[instrument(
        skip(self, request),
        fields(product_id = %request.product_id, quantity = request.quantity)
    )]
    pub async fn add_line(&mut self, request: AddLine) -> Result<&CartState, CartError> {
        let user = self.require_user().await?;
        let quantity = NonZeroU32::new(request.quantity).ok_or(CartError::InvalidQuantity)?;

        let snapshot = self
            .lookup
            .lookup(&request.product_id)
            .await
            .map_err(|source| {
                warn!(error = %source, "product lookup failed");
                CartError::ProductLookupFailed {
                    product_id: request.product_id.clone(),
                    source,
                }
            })?;

        let line = CartLine::new(
            LineId::generate(&request.product_id),
            request.product_id,
            snapshot,
            quantity,
            request.attributes,
            request.variant_id,
        );
        self.commit(user, CartAction::Insert(line)).await
    }

    /// Set a line's quantity. Zero and negative values clamp to one; unknown
    /// lines are left alone.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Mirror`.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &mut self,
        line_id: &LineId,
        quantity: i64,
    ) -> Result<&CartState, CartError> {
        let user = self.require_user().await?;
        self.commit(
            user,
            CartAction::SetQuantity {
                line_id: line_id.clone(),
                quantity,
            },
        )
        .await
    }

    /// Remove a line if present.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` or `Mirror`.
    #[instrument(skip(self))]
    pub async fn remove_line(&mut self, line_id: &LineId) -> Result<&CartState, CartError> {
        let user = self.require_user().await?;
        self.commit(user, CartAction::Remove(line_id.clone())).await
    }

    /// Empty the cart. Signed-out callers get an empty cart too.
    ///
    /// # Errors
    ///
    /// `AuthUnavailable` or `Mirror`; never `Unauthenticated`.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.sync().await?;

        let state = std::mem::take(&mut self.state);
        self.state = state.apply(CartAction::Clear);

        if let Some(user) = self.user {
            self.mirror.erase(&MirrorKey::for_user(user)).await?;
            debug!(user_id = %user, "cart cleared");
        }
        Ok(())
    }

    async fn resolve(&mut self) -> Result<Option<UserId>, CartError> {
        let status = *self
            .auth
            .wait_for(|status| !status.is_pending())
            .await
            .map_err(|_| CartError::AuthUnavailable)?;
        Ok(status.user_id())
    }

    async fn require_user(&mut self) -> Result<UserId, CartError> {
        self.sync().await?;
        self.user.ok_or(CartError::Unauthenticated)
    }

    async fn enter(&mut self, user: UserId) -> Result<(), CartError> {
        self.user = None;
        self.state = CartState::empty();

        let key = MirrorKey::for_user(user);
        match self.mirror.load(&key).await {
            Ok(Some(lines)) => self.state = CartState::from_lines(lines),
            Ok(None) => {}
            Err(MirrorError::Corrupt(error)) => {
                warn!(%key, %error, "discarding unreadable cart mirror");
            }
            Err(error) => return Err(error.into()),
        }

        self.user = Some(user);
        debug!(user_id = %user, lines = self.state.lines().len(), "cart loaded");
        Ok(())
    }

    async fn leave(&mut self, previous: UserId) -> Result<(), CartError> {
        self.user = None;
        self.state = CartState::empty();
        self.mirror.erase(&MirrorKey::for_user(previous)).await?;
        info!(user_id = %previous, "cart emptied on sign-out");
        Ok(())
    }

    async fn commit(&mut self, user: UserId, action: CartAction) -> Result<&CartState, CartError> {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(action);
        self.mirror
            .save(&MirrorKey::for_user(user), self.state.lines())
            .await?;
        Ok(&self.state)
    }
}
