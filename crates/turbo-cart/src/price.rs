//! Price type for cart totals.
//!
//! Catalog records keep the backend's JSON number untouched; [`Price`] is
//! the cents-based value derived from it for arithmetic.

use serde::{Serialize, Serializer};
use serde_json::Number;
use std::fmt;

/// A unit price or line total, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Create a price from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Create a price from a decimal amount, rounding to the nearest cent.
    ///
    /// Returns `None` when the amount is not finite or does not fit in
    /// cents.
    ///
    /// ```
    /// use turbo_cart::Price;
    /// assert_eq!(Price::from_decimal(179.9).unwrap().cents(), 17990);
    /// assert!(Price::from_decimal(1e300).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        let cents = (amount * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        if cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
            Some(Self::from_cents(cents as i64))
        } else {
            None
        }
    }

    /// Price of a JSON number as sent by the catalog.
    pub fn from_number(number: &Number) -> Option<Self> {
        if let Some(whole) = number.as_i64() {
            return whole.checked_mul(100).map(Self::from_cents);
        }
        number.as_f64().and_then(Self::from_decimal)
    }

    /// The zero price.
    pub const fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Amount in cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Amount as a decimal number.
    pub fn to_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Multiply by a quantity, returning `None` on overflow.
    pub fn try_multiply(&self, quantity: u32) -> Option<Self> {
        self.cents.checked_mul(i64::from(quantity)).map(Self::from_cents)
    }

    /// Add two prices, returning `None` on overflow.
    pub fn try_add(&self, other: &Self) -> Option<Self> {
        self.cents.checked_add(other.cents).map(Self::from_cents)
    }

    /// Sum an iterator of prices, returning `None` on overflow.
    pub fn try_sum<'a>(prices: impl IntoIterator<Item = &'a Price>) -> Option<Self> {
        prices
            .into_iter()
            .try_fold(Self::zero(), |acc, price| acc.try_add(price))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl From<Price> for Number {
    fn from(price: Price) -> Self {
        if price.cents % 100 == 0 {
            return Number::from(price.cents / 100);
        }
        // Finite by construction, so the fallback is never taken.
        Number::from_f64(price.to_decimal()).unwrap_or_else(|| Number::from(price.cents / 100))
    }
}
