//! Type-safe money representation using decimal arithmetic.
//!
//! Amounts are carried as [`Decimal`] and serialized as decimal strings
//! (`"100.00"`), which is the shape every backend sends on the wire.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors produced by money arithmetic and parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("cannot combine {left} with {right}")]
    CurrencyMismatch {
        /// Currency of the left-hand amount.
        left: CurrencyCode,
        /// Currency of the right-hand amount.
        right: CurrencyCode,
    },
    /// Arithmetic overflowed the decimal range.
    #[error("amount overflow")]
    Overflow,
    /// A negative amount was used where only non-negative amounts make sense.
    #[error("amount must not be negative: {0}")]
    Negative(Decimal),
    /// The amount string is not a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// The currency code is not one we sell in.
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
}

/// ISO 4217 currency codes the storefront can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    AED,
    SGD,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::AED => "AED",
            Self::SGD => "SGD",
        }
    }

    /// Display symbol used when formatting prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::CAD => "CA$",
            Self::AUD => "A$",
            Self::AED => "AED ",
            Self::SGD => "S$",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "AED" => Ok(Self::AED),
            "SGD" => Ok(Self::SGD),
            other => Err(MoneyError::UnsupportedCurrency(other.to_owned())),
        }
    }
}

/// A monetary amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in the currency's standard unit (rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse an amount string such as `"249.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] if the string is not a decimal.
    pub fn parse(amount: &str, currency_code: CurrencyCode) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(amount.to_owned()))?;
        Ok(Self::new(amount, currency_code))
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or decimal overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        if self.currency_code != other.currency_code {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency_code,
                right: other.currency_code,
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Multiply a unit price by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product leaves the decimal range.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Sum a sequence of amounts. Returns `None` for an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the amounts use different currencies.
    pub fn sum<I>(amounts: I) -> Result<Option<Self>, MoneyError>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(None, |acc: Option<Self>, next| match acc {
                None => Ok(Some(next)),
                Some(total) => total.checked_add(next).map(Some),
            })
    }

    /// Amount in minor units (paise, cents), rounded half away from zero.
    ///
    /// Payment gateways take integer minor units.
    ///
    /// # Errors
    ///
    /// Returns an error for negative amounts or amounts that do not fit `u64`.
    pub fn minor_units(self) -> Result<u64, MoneyError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(MoneyError::Negative(self.amount));
        }
        let scaled = self
            .amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        scaled.to_u64().ok_or(MoneyError::Overflow)
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn inr(amount: &str) -> Money {
        Money::parse(amount, CurrencyCode::INR).unwrap()
    }

    #[test]
    fn test_sum_same_currency() {
        let total = Money::sum([inr("100"), inr("250")]).unwrap().unwrap();
        assert_eq!(total, inr("350"));
    }

    #[test]
    fn test_sum_empty_is_none() {
        assert_eq!(Money::sum(Vec::new()).unwrap(), None);
    }

    #[test]
    fn test_sum_mixed_currency_fails() {
        let usd = Money::parse("1", CurrencyCode::USD).unwrap();
        assert!(matches!(
            Money::sum([inr("1"), usd]),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(inr("12.50").checked_mul(4).unwrap(), inr("50"));
    }

    #[test]
    fn test_minor_units_rounds() {
        assert_eq!(inr("350").minor_units().unwrap(), 35_000);
        assert_eq!(inr("10.005").minor_units().unwrap(), 1001);
        assert!(matches!(
            inr("-1").minor_units(),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_invalid_amount() {
        assert!(matches!(
            Money::parse("twelve", CurrencyCode::INR),
            Err(MoneyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(inr("99.50")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": "99.50", "currencyCode": "INR"})
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(inr("350").to_string(), "₹350.00");
    }
}
