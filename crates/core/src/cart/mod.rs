//! Shopping cart domain: lines, aggregate state, and the reducer.
//!
//! Nothing here performs I/O. Product lookup, persistence, and
//! authentication gating live in the storefront's cart container, which feeds
//! [`CartAction`]s through [`CartState::apply`].

mod line;
mod state;

pub use line::{CartLine, ProductSnapshot};
pub use state::{CartAction, CartState};
