//! Core types for Mercato.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attributes;
pub mod id;
pub mod price;

pub use attributes::Attributes;
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency, round_to_cents};
