//! Order totals and confirmation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CheckoutError, CheckoutReview, PaymentMethod, ShippingDetails};
use crate::cart::{CartLine, CartState};
use crate::types::{CurrencyCode, Price, round_to_cents};

/// Totals shown beside the checkout forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Price,
    /// Shipping is free.
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Compute totals for a cart. Tax is `subtotal × tax_rate` rounded to cents.
    #[must_use]
    pub fn from_cart(cart: &CartState, tax_rate: Decimal, currency: CurrencyCode) -> Self {
        let subtotal = cart.subtotal();
        let shipping = Decimal::ZERO;
        let tax = round_to_cents(subtotal * tax_rate);
        let total = subtotal + shipping + tax;

        Self {
            subtotal: Price::new(subtotal, currency),
            shipping: Price::new(shipping, currency),
            tax: Price::new(tax, currency),
            total: Price::new(total, currency),
        }
    }
}

/// Receipt produced when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub summary: OrderSummary,
    pub shipping: ShippingDetails,
    pub payment: PaymentMethod,
}

impl OrderConfirmation {
    /// Build a confirmation from a completed review and the cart contents.
    ///
    /// # Errors
    ///
    /// `EmptyCart` if the cart has no lines.
    pub fn new(
        review: CheckoutReview<'_>,
        cart: &CartState,
        tax_rate: Decimal,
        currency: CurrencyCode,
        placed_at: DateTime<Utc>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            order_number: order_number(placed_at),
            placed_at,
            lines: cart.lines().to_vec(),
            summary: OrderSummary::from_cart(cart, tax_rate, currency),
            shipping: review.shipping.clone(),
            payment: review.payment.clone(),
        })
    }
}

/// Human-facing order number: `ORD-YYYYMMDD-XXXXXX`.
#[must_use]
pub fn order_number(placed_at: DateTime<Utc>) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("ORD-{}-{suffix}", placed_at.format("%Y%m%d"))
}
