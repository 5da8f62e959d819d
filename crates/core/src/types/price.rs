//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are fixed-point amounts with two decimal places, matching the
//! `NUMERIC(6, 2)` column they are stored in. On the wire they are rendered as
//! strings (`"19.99"`) so no precision is lost to floating point.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};

use super::Quantity;

/// Errors that can occur when validating a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// More significant digits than the column allows.
    #[error("Ensure that there are no more than {max} digits in total.")]
    TooManyDigits {
        /// Maximum number of digits.
        max: u32,
    },
    /// More fractional digits than the column allows.
    #[error("Ensure that there are no more than {max} decimal places.")]
    TooManyDecimalPlaces {
        /// Maximum number of decimal places.
        max: u32,
    },
    /// More integer digits than the column allows.
    #[error("Ensure that there are no more than {max} digits before the decimal point.")]
    TooManyWholeDigits {
        /// Maximum number of digits before the decimal point.
        max: u32,
    },
    /// The amount is below zero.
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
}

/// A non-negative item price with at most 6 digits, 2 of them decimal.
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use shopping_cart_core::Price;
///
/// let price = Price::parse(Decimal::new(1999, 2)).unwrap();
/// assert_eq!(price.to_string(), "19.99");
///
/// assert!(Price::parse(Decimal::new(-1, 0)).is_err());       // negative
/// assert!(Price::parse(Decimal::new(10_000_000, 2)).is_err()); // 7 digits
/// assert!(Price::parse(Decimal::new(1_999, 3)).is_err());     // 3 decimal places
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Maximum number of digits in total.
    pub const MAX_DIGITS: u32 = 6;
    /// Number of decimal places.
    pub const DECIMAL_PLACES: u32 = 2;

    /// Validate a decimal amount as a price.
    ///
    /// The digit limits are checked against the amount as written, so `10.000`
    /// is rejected for its third decimal place even though it is a whole value.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount has more than 6 digits, more than 2
    /// decimal places, more than 4 digits before the decimal point, or is
    /// negative.
    pub fn parse(amount: Decimal) -> Result<Self, PriceError> {
        let decimal_places = amount.scale();
        let digits = digit_count(amount.mantissa().unsigned_abs());
        let total_digits = digits.max(decimal_places);
        let whole_digits = total_digits - decimal_places;

        if total_digits > Self::MAX_DIGITS {
            return Err(PriceError::TooManyDigits {
                max: Self::MAX_DIGITS,
            });
        }
        if decimal_places > Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }
        if whole_digits > Self::MAX_DIGITS - Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyWholeDigits {
                max: Self::MAX_DIGITS - Self::DECIMAL_PLACES,
            });
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let mut amount = amount;
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Cost of `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: Quantity) -> Decimal {
        self.0 * Decimal::from(quantity.get())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::parse(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_fixed(self.0))
    }
}

/// Format a decimal amount with exactly two decimal places, rounding half away
/// from zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopping_cart_core::format_fixed;
///
/// assert_eq!(format_fixed(Decimal::new(50, 0)), "50.00");
/// assert_eq!(format_fixed(Decimal::new(12_345, 3)), "12.35");
/// ```
#[must_use]
pub fn format_fixed(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(
        Price::DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );
    format!("{rounded:.2}")
}

/// Number of decimal digits in `n`; zero counts as one digit.
const fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_valid_prices() {
        assert!(Price::parse(dec("0")).is_ok());
        assert!(Price::parse(dec("10")).is_ok());
        assert!(Price::parse(dec("10.5")).is_ok());
        assert!(Price::parse(dec("9999.99")).is_ok());
        assert!(Price::parse(dec("0.01")).is_ok());
    }

    #[test]
    fn test_parse_rescales_to_two_places() {
        let price = Price::parse(dec("10")).unwrap();
        assert_eq!(price.amount().scale(), 2);
        assert_eq!(price.to_string(), "10.00");
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse(dec("-0.01")), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_too_many_digits() {
        assert_eq!(
            Price::parse(dec("12345.67")),
            Err(PriceError::TooManyDigits { max: 6 })
        );
    }

    #[test]
    fn test_parse_too_many_decimal_places() {
        assert_eq!(
            Price::parse(dec("1.234")),
            Err(PriceError::TooManyDecimalPlaces { max: 2 })
        );
        // Trailing zeros still count, as written
        assert_eq!(
            Price::parse(dec("10.000")),
            Err(PriceError::TooManyDecimalPlaces { max: 2 })
        );
    }

    #[test]
    fn test_parse_too_many_whole_digits() {
        assert_eq!(
            Price::parse(dec("12345")),
            Err(PriceError::TooManyWholeDigits { max: 4 })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PriceError::TooManyDigits { max: 6 }.to_string(),
            "Ensure that there are no more than 6 digits in total."
        );
        assert_eq!(
            PriceError::Negative.to_string(),
            "Ensure this value is greater than or equal to 0."
        );
    }

    #[test]
    fn test_line_total() {
        let price = Price::parse(dec("20.00")).unwrap();
        let quantity = Quantity::new(2).unwrap();
        assert_eq!(price.line_total(quantity), dec("40.00"));
    }

    #[test]
    fn test_serializes_as_fixed_string() {
        let price = Price::parse(dec("10")).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"10.00\"");
    }

    #[test]
    fn test_deserializes_from_number_or_string() {
        let from_str: Price = serde_json::from_str("\"19.99\"").unwrap();
        let from_num: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(from_str, from_num);

        assert!(serde_json::from_str::<Price>("\"-5\"").is_err());
    }

    #[test]
    fn test_format_fixed_rounds_half_away_from_zero() {
        assert_eq!(format_fixed(dec("0.125")), "0.13");
        assert_eq!(format_fixed(dec("50")), "50.00");
        assert_eq!(format_fixed(Decimal::ZERO), "0.00");
    }
}
