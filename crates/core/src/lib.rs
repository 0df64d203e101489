//! Mercato Core - Shared domain library.
//!
//! This crate provides the domain model used by the Mercato components:
//! - `storefront` - Cart, wishlist, and checkout HTTP service
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The cart reducer and checkout wizard can be unit
//! tested without any collaborators.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, keys, prices, and attributes
//! - [`cart`] - Cart lines, aggregate state, and the reducer
//! - [`checkout`] - Three-step checkout wizard and order summary
//! - [`wishlist`] - Saved product list

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;
pub mod wishlist;

pub use types::*;
