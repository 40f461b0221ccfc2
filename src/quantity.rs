//! Quantity

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors parsing a quantity from text input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Input was not an integer.
    #[error("quantity is not a whole number: {0:?}")]
    NotANumber(String),
}

/// Number of units requested for a line item. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Coerce any integer into a quantity, clamping to `1..=u32::MAX`.
    pub fn clamped(raw: i64) -> Self {
        let value = u32::try_from(raw.max(1)).unwrap_or(u32::MAX);

        NonZeroU32::new(value).map_or(Self::ONE, Self)
    }

    /// Quantity as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<NonZeroU32> for Quantity {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<i32> for Quantity {
    fn from(value: i32) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    /// Parses form input. Non-positive values clamp to one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self::clamped)
            .map_err(|_err| QuantityError::NotANumber(s.to_string()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
