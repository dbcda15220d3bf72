//! Type-safe price representation using decimal arithmetic.
//!
//! Menu cards display prices as text such as `$4.50`. [`Price::parse`] turns
//! that text into a non-negative [`Decimal`] amount; [`PricePolicy`] decides
//! what happens when the text is unusable.
//!
//! Prices serialize as JSON numbers so stored carts stay readable by the page
//! script that wrote the same key before.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The text is empty once the currency symbol is stripped.
    #[error("price cannot be empty")]
    Empty,
    /// The text is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount has more precision than a stored JSON number keeps.
    #[error("price cannot be stored exactly: {0}")]
    TooPrecise(Decimal),
}

/// A non-negative amount in the shop's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooPrecise`] if it would not read back unchanged from
    /// the stored cart.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if !survives_json_number(amount) {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero and
    /// [`PriceError::TooPrecise`] if the amount is too large to store exactly.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// Parse displayed price text such as `$4.50` or ` 3 `.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty, not a decimal number, or negative.
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if digits.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(digits).map_err(|_| PriceError::NotANumber(trimmed.to_owned()))?;
        Self::new(amount)
    }

    /// Parse displayed price text, applying `policy` when the text is unusable.
    ///
    /// Returns `None` when the policy rejects the text.
    #[must_use]
    pub fn parse_with_policy(text: &str, policy: PricePolicy) -> Option<Self> {
        match (Self::parse(text), policy) {
            (Ok(price), _) => Some(price),
            (Err(_), PricePolicy::Reject) => None,
            (Err(_), PricePolicy::CoerceToZero) => Some(Self::ZERO),
        }
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to cents and formatted with two places (`4.50`).
    #[must_use]
    pub fn to_cents_string(&self) -> String {
        format_amount(self.0)
    }
}

/// Whether `amount` reads back unchanged after a trip through a JSON number.
///
/// Stored prices are `f64`s; reading one back goes through its shortest
/// decimal rendering, so that is the comparison made here.
fn survives_json_number(amount: Decimal) -> bool {
    amount
        .to_f64()
        .and_then(|value| Decimal::from_str(&value.to_string()).ok())
        .is_some_and(|back| back == amount)
}

/// Round a decimal amount to cents, halves away from zero.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Format a decimal amount rounded to two places (`9` becomes `9.00`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    round_to_cents(amount).to_string()
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_cents_string())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// What to do with price text that does not parse as a non-negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Refuse to add the item to the cart.
    #[default]
    Reject,
    /// Add the item with a price of zero.
    #[serde(rename = "zero")]
    CoerceToZero,
}

impl PricePolicy {
    /// Returns the configuration name of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::CoerceToZero => "zero",
        }
    }
}

impl FromStr for PricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "zero" => Ok(Self::CoerceToZero),
            other => Err(format!("unknown price policy '{other}' (expected reject or zero)")),
        }
    }
}
