//! Shipping and payment form input with validation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::FieldError;

/// Shipping address submitted in the first checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub name: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingDetails {
    /// Trim every field and drop a blank `address2`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            address1: self.address1.trim().to_owned(),
            address2: self
                .address2
                .map(|line| line.trim().to_owned())
                .filter(|line| !line.is_empty()),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
        }
    }

    /// Check minimum lengths for every required field.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let checks = [
            ("name", &self.name, 2, "Name is required"),
            ("address1", &self.address1, 5, "Address is required"),
            ("city", &self.city, 2, "City is required"),
            ("state", &self.state, 2, "State/Province is required"),
            ("postalCode", &self.postal_code, 3, "Postal code is required"),
            ("country", &self.country, 2, "Country is required"),
            ("phone", &self.phone, 10, "Phone number is required"),
        ];

        let errors: Vec<FieldError> = checks
            .into_iter()
            .filter(|(_, value, min, _)| value.trim().chars().count() < *min)
            .map(|(field, _, _, message)| FieldError::new(field, message))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Raw card details submitted in the payment step.
///
/// Deliberately not `Serialize`: the full card number and CVV never leave the
/// request that carried them. Only a [`PaymentMethod`] is kept.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_number", &"[REDACTED]")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// What the wizard retains about a validated card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub cardholder_name: String,
    /// Last four digits of the card number.
    pub last4: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
}

impl PaymentDetails {
    /// Validate the card against `today` and reduce it to a [`PaymentMethod`].
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failing field.
    pub fn validate(&self, today: NaiveDate) -> Result<PaymentMethod, Vec<FieldError>> {
        let mut errors = Vec::new();

        let cardholder_name = self.cardholder_name.trim();
        if cardholder_name.chars().count() < 2 {
            errors.push(FieldError::new("cardholderName", "Cardholder name is required"));
        }

        let digits: String = self.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("cardNumber", "Card number must be 16 digits"));
        }

        let month = self
            .expiry_month
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m));
        if month.is_none() {
            errors.push(FieldError::new("expiryMonth", "Expiry month is required"));
        }

        let year_text = self.expiry_year.trim();
        let year = if year_text.len() == 4 {
            year_text.parse::<i32>().ok()
        } else {
            None
        };
        if year.is_none() {
            errors.push(FieldError::new("expiryYear", "Expiry year is required"));
        }

        if let (Some(month), Some(year)) = (month, year)
            && (year, month) < (today.year(), today.month())
        {
            errors.push(FieldError::new("expiryYear", "Card has expired"));
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("cvv", "CVV must be 3-4 digits"));
        }

        match (errors.is_empty(), month, year) {
            (true, Some(expiry_month), Some(expiry_year)) => Ok(PaymentMethod {
                cardholder_name: cardholder_name.to_owned(),
                last4: digits.chars().skip(12).collect(),
                expiry_month,
                expiry_year,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Ada Lovelace".to_owned(),
            address1: "12 Analytical Way".to_owned(),
            address2: Some("  ".to_owned()),
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            postal_code: "NW1".to_owned(),
            country: "UK".to_owned(),
            phone: "0201234567".to_owned(),
        }
    }

    pub(crate) fn payment() -> PaymentDetails {
        PaymentDetails {
            cardholder_name: "Ada Lovelace".to_owned(),
            card_number: "4242 4242 4242 1234".to_owned(),
            expiry_month: "08".to_owned(),
            expiry_year: "2030".to_owned(),
            cvv: "123".to_owned(),
        }
    }

    pub(crate) fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_shipping_valid() {
        let details = shipping().normalized();
        assert!(details.validate().is_ok());
        assert_eq!(details.address2, None);
    }

    #[test]
    fn test_shipping_reports_every_short_field() {
        let details = ShippingDetails {
            name: "A".to_owned(),
            address1: "1 St".to_owned(),
            phone: "555".to_owned(),
            ..shipping()
        };
        let errors = details.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "address1", "phone"]);
    }

    #[test]
    fn test_payment_keeps_only_last_four() {
        let method = payment().validate(today()).unwrap();
        assert_eq!(method.last4, "1234");
        assert_eq!(method.expiry_month, 8);
        assert_eq!(method.expiry_year, 2030);
    }

    #[test]
    fn test_payment_rejects_short_card_and_bad_cvv() {
        let details = PaymentDetails {
            card_number: "4242".to_owned(),
            cvv: "12a".to_owned(),
            ..payment()
        };
        let errors = details.validate(today()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["cardNumber", "cvv"]);
    }

    #[test]
    fn test_payment_rejects_expired_card() {
        let details = PaymentDetails {
            expiry_month: "09".to_owned(),
            expiry_year: "2026".to_owned(),
            ..payment()
        };
        let errors = details.validate(today()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().message, "Card has expired");
    }

    #[test]
    fn test_payment_accepts_current_month() {
        let details = PaymentDetails {
            expiry_month: "10".to_owned(),
            expiry_year: "2026".to_owned(),
            ..payment()
        };
        assert!(details.validate(today()).is_ok());
    }

    #[test]
    fn test_payment_debug_redacts() {
        let debug = format!("{:?}", payment());
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("123\""));
        assert!(debug.contains("[REDACTED]"));
    }
}
