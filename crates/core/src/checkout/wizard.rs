//! Checkout step machine.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CheckoutError, PaymentDetails, PaymentMethod, ShippingDetails};

/// The three checkout steps, in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl CheckoutStep {
    /// The step before this one, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Shipping => None,
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
        })
    }
}

/// Everything needed to place an order, borrowed from the wizard.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutReview<'a> {
    pub shipping: &'a ShippingDetails,
    pub payment: &'a PaymentMethod,
}

/// Checkout progress for one customer.
///
/// Submitted details are kept when stepping back so the forms can be
/// pre-filled, matching the "Edit" links on the review page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutWizard {
    step: CheckoutStep,
    shipping: Option<ShippingDetails>,
    payment: Option<PaymentMethod>,
}

impl CheckoutWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentMethod> {
        self.payment.as_ref()
    }

    /// Submit the shipping form and advance to Payment.
    ///
    /// # Errors
    ///
    /// `WrongStep` unless on Shipping; `Validation` if any field is invalid.
    pub fn submit_shipping(&mut self, details: ShippingDetails) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;

        let details = details.normalized();
        details.validate().map_err(CheckoutError::Validation)?;

        self.shipping = Some(details);
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Submit the payment form and advance to Review.
    ///
    /// # Errors
    ///
    /// `WrongStep` unless on Payment; `Incomplete` if shipping is missing;
    /// `Validation` if the card is invalid or expired as of `today`.
    pub fn submit_payment(
        &mut self,
        details: &PaymentDetails,
        today: NaiveDate,
    ) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        if self.shipping.is_none() {
            return Err(CheckoutError::Incomplete);
        }

        let method = details.validate(today).map_err(CheckoutError::Validation)?;

        self.payment = Some(method);
        self.step = CheckoutStep::Review;
        Ok(())
    }

    /// Step back one step. A no-op on Shipping.
    pub fn back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Jump to `step`, which must not be ahead of the current step.
    ///
    /// # Errors
    ///
    /// `StepLocked` when `step` is ahead of the current step.
    pub fn edit(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if step > self.step {
            return Err(CheckoutError::StepLocked(step));
        }
        self.step = step;
        Ok(())
    }

    /// The details to show on the review page.
    ///
    /// # Errors
    ///
    /// `WrongStep` unless on Review; `Incomplete` if either part is missing.
    pub fn review(&self) -> Result<CheckoutReview<'_>, CheckoutError> {
        self.expect_step(CheckoutStep::Review)?;
        match (&self.shipping, &self.payment) {
            (Some(shipping), Some(payment)) => Ok(CheckoutReview { shipping, payment }),
            _ => Err(CheckoutError::Incomplete),
        }
    }

    /// Forget all progress.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}
