//! Decimal amounts for money.
//!
//! A [`FixedDecimal`] wraps a [`rust_decimal::Decimal`] and keeps the scale
//! (number of fractional digits) it was written or computed at, so `3.30`
//! renders as `3.30`. No operation in this module goes through binary
//! floating point.
//!
//! Arithmetic between values of different scale must name the target scale
//! and rounding mode ([`FixedDecimal::add_at`], [`FixedDecimal::mul_div`]).
//! The `+`/`-` operators only accept operands of the same scale.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Scale used for currency amounts (one minor unit = 0.01).
pub const CURRENCY_SCALE: u32 = 2;

/// Scale used for intermediate exact shares.
pub const EXACT_SCALE: u32 = 6;

/// Largest scale a [`FixedDecimal`] may carry.
pub const MAX_SCALE: u32 = 28;

/// Errors produced by decimal parsing and arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// The input string was empty.
    #[error("empty amount")]
    Empty,

    /// The input string was not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),

    /// The requested scale exceeds [`MAX_SCALE`].
    #[error("scale {0} exceeds the maximum of {MAX_SCALE}")]
    ScaleTooLarge(u32),

    /// Two operands of different scale were combined without a target scale.
    #[error("scale mismatch: {left} vs {right}")]
    ScaleMismatch { left: u32, right: u32 },

    /// The result does not fit the decimal range.
    #[error("amount out of range")]
    Overflow,

    /// The amount is representable but larger than the caller accepts.
    #[error("amount {value} exceeds the limit of {limit}")]
    OutOfRange {
        value: FixedDecimal,
        limit: FixedDecimal,
    },

    /// Division by a zero value.
    #[error("division by zero")]
    DivisionByZero,
}

/// How to drop digits when reducing the scale of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round to nearest, ties away from zero (`1.005 -> 1.01`, `-1.005 -> -1.01`).
    HalfUp,
    /// Truncate toward zero.
    Down,
    /// Round toward negative infinity.
    Floor,
}

impl Rounding {
    const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::Down => RoundingStrategy::ToZero,
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

/// A decimal number with an explicit scale.
///
/// Equality and ordering compare numeric values, so `1.0 == 1.00`.
///
/// # Examples
///
/// ```rust
/// use splitty_core::{FixedDecimal, Rounding};
///
/// let amount: FixedDecimal = "10.005".parse().unwrap();
/// assert_eq!(amount.scale(), 3);
/// assert_eq!(amount.rescale(2, Rounding::HalfUp).unwrap().to_string(), "10.01");
/// assert_eq!(FixedDecimal::new(1000, 2), FixedDecimal::from_integer(10));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FixedDecimal(Decimal);

impl FixedDecimal {
    /// Creates a value from raw units at the given scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale` exceeds [`MAX_SCALE`].
    #[must_use]
    pub fn new(units: i64, scale: u32) -> Self {
        Self::from(Decimal::new(units, scale))
    }

    /// Creates a whole number at scale 0.
    #[must_use]
    pub fn from_integer(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    /// Zero at the given scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale` exceeds [`MAX_SCALE`].
    #[must_use]
    pub fn zero(scale: u32) -> Self {
        Self::new(0, scale)
    }

    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Raw mantissa. At [`CURRENCY_SCALE`] this is a count of minor units.
    #[must_use]
    pub fn units(self) -> i128 {
        self.0.mantissa()
    }

    /// Number of fractional digits.
    #[must_use]
    pub fn scale(self) -> u32 {
        self.0.scale()
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Converts to another scale. Upscaling is exact; downscaling drops
    /// digits using `rounding`.
    pub fn rescale(self, scale: u32, rounding: Rounding) -> Result<Self, DecimalError> {
        if scale > MAX_SCALE {
            return Err(DecimalError::ScaleTooLarge(scale));
        }
        let mut value = self.0.round_dp_with_strategy(scale, rounding.strategy());
        value.rescale(scale);
        // `Decimal::rescale` settles for a smaller scale when the mantissa
        // would not fit.
        if value.scale() != scale {
            return Err(DecimalError::Overflow);
        }
        Ok(Self::from(value))
    }

    /// Rounds half-up to the currency's minor unit.
    pub fn round_currency(self) -> Result<Self, DecimalError> {
        self.rescale(CURRENCY_SCALE, Rounding::HalfUp)
    }

    /// Integer part, truncated toward zero, at scale 0.
    #[must_use]
    pub fn trunc(self) -> Self {
        Self::from(self.0.trunc())
    }

    /// Fractional part (`self - self.trunc()`), at the same scale as `self`.
    #[must_use]
    pub fn fract(self) -> Self {
        Self::from(self.0.fract())
    }

    /// Adds two values of the same scale.
    pub fn checked_add(self, rhs: Self) -> Result<Self, DecimalError> {
        self.ensure_same_scale(rhs)?;
        self.0
            .checked_add(rhs.0)
            .map(Self::from)
            .ok_or(DecimalError::Overflow)
    }

    /// Subtracts two values of the same scale.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, DecimalError> {
        self.ensure_same_scale(rhs)?;
        self.0
            .checked_sub(rhs.0)
            .map(Self::from)
            .ok_or(DecimalError::Overflow)
    }

    /// `self + rhs` for operands of any scale, expressed at `scale`.
    pub fn add_at(self, rhs: Self, scale: u32, rounding: Rounding) -> Result<Self, DecimalError> {
        let sum = self.0.checked_add(rhs.0).ok_or(DecimalError::Overflow)?;
        Self::from(sum).rescale(scale, rounding)
    }

    /// `self - rhs` for operands of any scale, expressed at `scale`.
    pub fn sub_at(self, rhs: Self, scale: u32, rounding: Rounding) -> Result<Self, DecimalError> {
        let difference = self.0.checked_sub(rhs.0).ok_or(DecimalError::Overflow)?;
        Self::from(difference).rescale(scale, rounding)
    }

    /// `self * mul / div`, rounded once to `scale`.
    ///
    /// The quotient carries the full 28 significant digits of [`Decimal`]
    /// before the final rounding.
    pub fn mul_div(
        self,
        mul: Self,
        div: Self,
        scale: u32,
        rounding: Rounding,
    ) -> Result<Self, DecimalError> {
        if div.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let quotient = self
            .0
            .checked_mul(mul.0)
            .and_then(|product| product.checked_div(div.0))
            .ok_or(DecimalError::Overflow)?;
        Self::from(quotient).rescale(scale, rounding)
    }

    /// Sums values that all share `scale`. An empty slice sums to zero.
    pub fn checked_sum(values: &[Self], scale: u32) -> Result<Self, DecimalError> {
        values
            .iter()
            .try_fold(Self::zero(scale), |acc, value| acc.checked_add(*value))
    }

    fn ensure_same_scale(self, rhs: Self) -> Result<(), DecimalError> {
        if self.scale() == rhs.scale() {
            Ok(())
        } else {
            Err(DecimalError::ScaleMismatch {
                left: self.scale(),
                right: rhs.scale(),
            })
        }
    }
}

impl From<Decimal> for FixedDecimal {
    /// Wraps `value`, dropping the sign of a negative zero.
    fn from(mut value: Decimal) -> Self {
        if value.is_zero() {
            value.set_sign_positive(true);
        }
        Self(value)
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0.to_string())
    }
}

impl fmt::Debug for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FixedDecimal")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl FromStr for FixedDecimal {
    type Err = DecimalError;

    /// Parses user input such as `10`, `-3.50` or `12,75`, keeping the
    /// written scale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DecimalError::Empty);
        }
        Decimal::from_str_exact(&trimmed.replace(',', "."))
            .map(Self::from)
            .map_err(|_| DecimalError::Invalid(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for FixedDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

fn assert_same_scale(left: FixedDecimal, right: FixedDecimal) {
    assert_eq!(
        left.scale(),
        right.scale(),
        "operands have different scale; use add_at/sub_at"
    );
}

impl Add for FixedDecimal {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the operands have different scale or the sum overflows.
    fn add(self, rhs: Self) -> Self::Output {
        assert_same_scale(self, rhs);
        Self::from(self.0 + rhs.0)
    }
}

impl AddAssign for FixedDecimal {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedDecimal {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the operands have different scale or the difference overflows.
    fn sub(self, rhs: Self) -> Self::Output {
        assert_same_scale(self, rhs);
        Self::from(self.0 - rhs.0)
    }
}

impl SubAssign for FixedDecimal {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FixedDecimal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from(-self.0)
    }
}
