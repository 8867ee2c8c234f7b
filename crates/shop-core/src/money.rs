//! # Currency Handling
//!
//! Minor-unit conversion for the single configured checkout currency.
//! The provider prices everything in the smallest currency unit (cents,
//! paise), while carts and orders speak decimal major units.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    INR,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the lowercase ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::INR => "inr",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
        }
    }

    /// Parse an ISO 4217 code (case-insensitive)
    pub fn from_code(code: &str) -> PaymentResult<Self> {
        match code.to_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "inr" => Ok(Currency::INR),
            "jpy" => Ok(Currency::JPY),
            "cad" => Ok(Currency::CAD),
            "aud" => Ok(Currency::AUD),
            other => Err(PaymentError::UnsupportedCurrency {
                currency: other.to_string(),
            }),
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    pub fn to_minor_units(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_minor_units(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        let usd = Currency::USD;
        assert_eq!(usd.to_minor_units(10.99), 1099);
        assert_eq!(usd.from_minor_units(1099), 10.99);
        // rounds per provider convention
        assert_eq!(usd.to_minor_units(19.999), 2000);

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_minor_units(1000.0), 1000);
        assert_eq!(jpy.from_minor_units(1000), 1000.0);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code("INR").unwrap(), Currency::INR);
        assert_eq!(Currency::from_code("usd").unwrap(), Currency::USD);
        assert!(matches!(
            Currency::from_code("xyz"),
            Err(PaymentError::UnsupportedCurrency { .. })
        ));
    }
}
