use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// A cash amount in the operator's currency.
///
/// Wraps `rust_decimal::Decimal` so totals and shares are computed in exact
/// base-10 arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Price of a single token. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenPrice(Decimal);

impl TokenPrice {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::Validation(
                "Token price must be positive".to_string(),
            ))
        }
    }

    /// Builds a price from a literal known to be positive.
    pub(crate) const fn from_positive(value: Decimal) -> Self {
        Self(value)
    }

    /// Interprets a raw override value, where zero or negative means "not set".
    pub fn from_override(value: Option<Decimal>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Cash collected for `count` tokens at this price.
    pub fn total_for(&self, count: TokenCount) -> Result<Money, LedgerError> {
        self.0
            .checked_mul(Decimal::from(count.value()))
            .map(Money)
            .ok_or_else(|| {
                LedgerError::Validation(format!(
                    "{} tokens at {} exceed the representable amount",
                    count, self
                ))
            })
    }
}

impl<'de> Deserialize<'de> for TokenPrice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for TokenPrice {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TokenPrice> for Money {
    fn from(price: TokenPrice) -> Self {
        Self(price.0)
    }
}

impl fmt::Display for TokenPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Deserializes an optional override price, mapping zero or negative values to `None`.
///
/// Stored records may carry `0` as an "unset" marker.
pub fn deserialize_override<'de, D>(deserializer: D) -> Result<Option<TokenPrice>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Decimal>::deserialize(deserializer)?;
    Ok(TokenPrice::from_override(raw))
}

/// Number of tokens collected from one machine. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenCount(u32);

impl TokenCount {
    pub fn new(value: u32) -> Result<Self, LedgerError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::Validation(
                "Token count must be positive".to_string(),
            ))
        }
    }

    /// Parses an operator-entered token count from its leading integer, so
    /// `"2.5"` and `"10 fichas"` count 2 and 10. Blank, non-numeric and
    /// non-positive entries yield `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim_start();
        let unsigned = input.strip_prefix('+').unwrap_or(input);
        if unsigned.starts_with('-') {
            return None;
        }
        let digits_end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        unsigned[..digits_end]
            .parse::<u32>()
            .ok()
            .and_then(|v| Self::new(v).ok())
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl<'de> Deserialize<'de> for TokenCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
