//! Persisted cart mirror.
//!
//! The mirror is a write-behind copy of the cart lines, one slot per user.
//! It is rewritten wholesale after every in-memory mutation and trusted
//! as-is when a user's cart is loaded.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use mercato_core::UserId;
use mercato_core::cart::CartLine;
use thiserror::Error;
use tower_sessions::Session;

/// Storage key for one user's cart slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MirrorKey(String);

impl MirrorKey {
    /// The slot for `user_id`: `cart_items:{user_id}`.
    #[must_use]
    pub fn for_user(user_id: UserId) -> Self {
        Self(format!("cart_items:{user_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MirrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from a mirror backend.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The slot holds data that is not a list of cart lines.
    #[error("corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The backing store failed.
    #[error("cart store unavailable: {0}")]
    Backend(String),
}

/// Keyed storage for serialized cart lines.
pub trait CartMirror: Send + Sync {
    /// Read a slot. `Ok(None)` when nothing has been saved.
    fn load(
        &self,
        key: &MirrorKey,
    ) -> impl Future<Output = Result<Option<Vec<CartLine>>, MirrorError>> + Send;

    /// Overwrite a slot with the full line list.
    fn save(
        &self,
        key: &MirrorKey,
        lines: &[CartLine],
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Remove a slot. Erasing a missing slot is not an error.
    fn erase(&self, key: &MirrorKey) -> impl Future<Output = Result<(), MirrorError>> + Send;
}

// =============================================================================
// SessionMirror
// =============================================================================

/// Mirror stored in the visitor's server-side session.
#[derive(Debug, Clone)]
pub struct SessionMirror {
    session: Session,
}

impl SessionMirror {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartMirror for SessionMirror {
    async fn load(&self, key: &MirrorKey) -> Result<Option<Vec<CartLine>>, MirrorError> {
        let value = self
            .session
            .get_value(key.as_str())
            .await
            .map_err(|e| MirrorError::Backend(e.to_string()))?;

        value
            .map(serde_json::from_value::<Vec<CartLine>>)
            .transpose()
            .map_err(MirrorError::Corrupt)
    }

    async fn save(&self, key: &MirrorKey, lines: &[CartLine]) -> Result<(), MirrorError> {
        self.session
            .insert(key.as_str(), lines)
            .await
            .map_err(|e| MirrorError::Backend(e.to_string()))
    }

    async fn erase(&self, key: &MirrorKey) -> Result<(), MirrorError> {
        self.session
            .remove_value(key.as_str())
            .await
            .map(|_| ())
            .map_err(|e| MirrorError::Backend(e.to_string()))
    }
}

// =============================================================================
// MemoryMirror
// =============================================================================

/// In-process mirror holding JSON values. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    slots: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl MemoryMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a slot.
    #[must_use]
    pub fn get(&self, key: &MirrorKey) -> Option<serde_json::Value> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.as_str())
            .cloned()
    }

    /// Write raw JSON into a slot, bypassing serialization.
    pub fn put(&self, key: &MirrorKey, value: serde_json::Value) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.as_str().to_owned(), value);
    }
}

impl CartMirror for MemoryMirror {
    async fn load(&self, key: &MirrorKey) -> Result<Option<Vec<CartLine>>, MirrorError> {
        self.get(key)
            .map(serde_json::from_value::<Vec<CartLine>>)
            .transpose()
            .map_err(MirrorError::Corrupt)
    }

    async fn save(&self, key: &MirrorKey, lines: &[CartLine]) -> Result<(), MirrorError> {
        let value = serde_json::to_value(lines).map_err(|e| MirrorError::Backend(e.to_string()))?;
        self.put(key, value);
        Ok(())
    }

    async fn erase(&self, key: &MirrorKey) -> Result<(), MirrorError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key.as_str());
        Ok(())
    }
}
