//! Per-request cart bound to the visitor's session.

use std::ops::{Deref, DerefMut};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::watch;
use tower_sessions::Session;

use super::{AuthStatus, CartContainer, CartError, SessionMirror};
use crate::catalog::CatalogClient;
use crate::error::{AppError, set_sentry_user};
use crate::middleware::auth::current_user;
use crate::state::AppState;

/// The container used by request handlers.
pub type StorefrontCart = CartContainer<CatalogClient, SessionMirror>;

/// Extractor yielding a [`StorefrontCart`] already synced with the session.
///
/// The session's signed-in user feeds the container's status channel. The
/// extractor keeps the sending half so a logout handler can publish the
/// sign-out to the same container.
pub struct SessionCart {
    cart: StorefrontCart,
    auth: watch::Sender<AuthStatus>,
}

impl SessionCart {
    /// Publish a sign-out and apply it: the cart empties and the signed-out
    /// user's mirror is erased.
    ///
    /// # Errors
    ///
    /// `Mirror` if the slot cannot be erased.
    pub async fn sign_out(&mut self) -> Result<(), CartError> {
        self.auth.send_replace(AuthStatus::Unauthenticated);
        self.cart.sync().await
    }
}

impl Deref for SessionCart {
    type Target = StorefrontCart;

    fn deref(&self) -> &Self::Target {
        &self.cart
    }
}

impl DerefMut for SessionCart {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cart
    }
}

impl FromRequestParts<AppState> for SessionCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let user = current_user(&session).await;
        if let Some(user) = &user {
            set_sentry_user(&user.id);
        }

        let (auth, status) = watch::channel(AuthStatus::from(user.map(|user| user.id)));
        let mut cart = CartContainer::new(
            state.catalog().clone(),
            SessionMirror::new(session),
            status,
        );
        cart.sync().await?;

        Ok(Self { cart, auth })
    }
}
