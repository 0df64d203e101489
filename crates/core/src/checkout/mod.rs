//! Three-step checkout: shipping, payment, review.
//!
//! The wizard is a plain enum-driven state holder. Its only invariant is that
//! Review cannot be reached without valid shipping and payment details, and
//! an order cannot be placed from an empty cart.

mod details;
mod summary;
mod wizard;

use serde::Serialize;
use thiserror::Error;

pub use details::{PaymentDetails, PaymentMethod, ShippingDetails};
pub use summary::{OrderConfirmation, OrderSummary, order_number};
pub use wizard::{CheckoutReview, CheckoutStep, CheckoutWizard};

/// A single form validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name (camelCase, as submitted).
    pub field: &'static str,
    /// Human-readable message.
    pub message: &'static str,
}

impl FieldError {
    #[must_use]
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Errors from checkout transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Submitted form data failed validation.
    #[error("invalid checkout details ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// The action belongs to a different step than the current one.
    #[error("expected {expected} step, wizard is on {actual}")]
    WrongStep {
        /// Step the action requires.
        expected: CheckoutStep,
        /// Step the wizard is on.
        actual: CheckoutStep,
    },

    /// Tried to jump forward past steps that have not been completed.
    #[error("cannot jump ahead to {0}")]
    StepLocked(CheckoutStep),

    /// Review requested before shipping and payment were both provided.
    #[error("checkout is incomplete")]
    Incomplete,

    /// Order placement attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,
}
