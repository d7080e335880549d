//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are stored in the currency's standard unit (naira, not kobo).
//! Payment gateways expect integer minor units, see [`Price::minor_units`].

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Largest amount a money column (`NUMERIC(12,2)`) can hold: 9,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Why an amount can't be stored as money.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount cannot be negative")]
    Negative,
    #[error("amount cannot have more than two decimal places")]
    TooPrecise,
    #[error("amount is too large")]
    TooLarge,
}

/// Check that `amount` is a storable money value: not negative, at most two
/// decimal places and no larger than [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns the first [`AmountError`] the amount violates.
pub fn checked_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative);
    }
    if amount.round_dp(2) != amount {
        return Err(AmountError::TooPrecise);
    }
    if amount > MAX_AMOUNT {
        return Err(AmountError::TooLarge);
    }
    Ok(amount)
}

/// Add two amounts, failing if the sum leaves the storable range.
///
/// # Errors
///
/// Returns [`AmountError::TooLarge`] on overflow or past [`MAX_AMOUNT`].
pub fn add_amounts(a: Decimal, b: Decimal) -> Result<Decimal, AmountError> {
    a.checked_add(b)
        .filter(|sum| *sum <= MAX_AMOUNT)
        .ok_or(AmountError::TooLarge)
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store currency.
    #[must_use]
    pub const fn ngn(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::NGN)
    }

    /// Amount in minor units (kobo for NGN), rounded to the nearest unit.
    ///
    /// Returns `None` for negative amounts or values that do not fit an `i64`.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        if self.amount.is_sign_negative() {
            return None;
        }
        self.amount
            .checked_mul(Decimal::from(self.currency_code.minor_unit_factor()))?
            .round()
            .to_i64()
    }
}

impl fmt::Display for Price {
    /// Formats like `₦5,500` or `₦1,250.5` (at most two fraction digits).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.amount.round_dp(2).normalize();
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        let text = rounded.abs().to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        write!(f, "{sign}{}{grouped}", self.currency_code.symbol())?;
        if !fraction.is_empty() {
            write!(f, ".{fraction}")?;
        }
        Ok(())
    }
}

/// ISO 4217 currency codes accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NGN,
}

impl CurrencyCode {
    /// Currency symbol used in display strings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NGN => "₦",
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NGN => "NGN",
        }
    }

    /// Number of minor units per standard unit.
    #[must_use]
    pub const fn minor_unit_factor(self) -> i64 {
        match self {
            Self::NGN => 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units() {
        assert_eq!(Price::ngn(Decimal::from(5500)).minor_units(), Some(550_000));
        assert_eq!(Price::ngn(Decimal::new(1999, 2)).minor_units(), Some(1999));
        assert_eq!(Price::ngn(Decimal::from(-1)).minor_units(), None);
    }

    #[test]
    fn test_minor_units_does_not_overflow() {
        assert_eq!(Price::ngn(Decimal::MAX).minor_units(), None);
        assert_eq!(
            Price::ngn(MAX_AMOUNT).minor_units(),
            Some(999_999_999_999)
        );
    }

    #[test]
    fn test_checked_amount() {
        assert_eq!(checked_amount(Decimal::new(125_050, 2)), Ok(Decimal::new(125_050, 2)));
        assert_eq!(checked_amount(Decimal::from(-1)), Err(AmountError::Negative));
        assert_eq!(checked_amount(Decimal::new(10_005, 3)), Err(AmountError::TooPrecise));
        // Trailing zeros beyond two places are fine.
        assert!(checked_amount(Decimal::new(10_500, 3)).is_ok());
        assert_eq!(checked_amount(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            checked_amount(Decimal::from(10_000_000_000_i64)),
            Err(AmountError::TooLarge)
        );
        assert_eq!(checked_amount(Decimal::MAX), Err(AmountError::TooLarge));
    }

    #[test]
    fn test_add_amounts() {
        assert_eq!(
            add_amounts(Decimal::from(5000), Decimal::from(500)),
            Ok(Decimal::from(5500))
        );
        assert_eq!(
            add_amounts(MAX_AMOUNT, Decimal::new(1, 2)),
            Err(AmountError::TooLarge)
        );
        assert_eq!(
            add_amounts(Decimal::MAX, Decimal::MAX),
            Err(AmountError::TooLarge)
        );
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::ngn(Decimal::from(5500)).to_string(), "₦5,500");
        assert_eq!(Price::ngn(Decimal::from(999)).to_string(), "₦999");
        assert_eq!(
            Price::ngn(Decimal::from(1_234_567)).to_string(),
            "₦1,234,567"
        );
    }

    #[test]
    fn test_display_trims_fraction() {
        assert_eq!(Price::ngn(Decimal::new(125_050, 2)).to_string(), "₦1,250.5");
        assert_eq!(Price::ngn(Decimal::new(10_000, 2)).to_string(), "₦100");
    }
}
