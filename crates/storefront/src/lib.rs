//! Mercato Storefront library.
//!
//! The cart, wishlist, and checkout HTTP service as a library, so the router
//! can be driven directly by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
