//! Weighted money allocation.
//!
//! Splits a total into per-participant shares rounded to the currency's minor
//! unit, such that the shares sum exactly to the rounded total.
//!
//! # Algorithm Summary
//!
//! 1. Compute each participant's exact share `total * weight / weight_sum`
//!    at [`EXACT_SCALE`], rounding half-up.
//! 2. Round every exact share half-up to [`CURRENCY_SCALE`].
//! 3. The rounded shares may miss `round(total, 2)` by a few minor units
//!    (the drift). Hand the drift back one minor unit at a time, ordered by
//!    the fractional part of each exact share (largest-remainder
//!    distribution), walking the order cyclically.

use std::fmt;

use thiserror::Error;

use crate::bill::BillAmounts;
use crate::decimal::{CURRENCY_SCALE, DecimalError, EXACT_SCALE, FixedDecimal, Rounding};

/// Names the input amount a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    Total,
    Subtotal,
    Tax,
    Tip,
    /// Weight at the given zero-based participant index.
    Weight(usize),
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total"),
            Self::Subtotal => write!(f, "subtotal"),
            Self::Tax => write!(f, "tax"),
            Self::Tip => write!(f, "tip"),
            Self::Weight(index) => write!(f, "weight #{}", index + 1),
        }
    }
}

/// Allocation request validation failures.
///
/// All of these are detected before any computation starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No participants to split between.
    #[error("participant count must be greater than zero, got {count}")]
    InvalidParticipantCount { count: usize },

    /// The total, a bill component, or a weight was below zero.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        field: AmountField,
        value: FixedDecimal,
    },

    /// Weights were supplied but not one per participant.
    #[error("expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    /// Weights were supplied but sum to zero.
    #[error("weights must have a positive sum")]
    DegenerateWeights,

    /// An amount too large for the fixed-point range.
    #[error(transparent)]
    Arithmetic(#[from] DecimalError),
}

/// Splits `total` between `participant_count` participants.
///
/// With `weights` absent every participant gets weight 1. The result has one
/// share per participant, in order, each at [`CURRENCY_SCALE`], summing
/// exactly to `round(total, 2, HALF_UP)`.
///
/// Leftover minor units go to the largest fractional remainders, ties to the
/// lowest index. Excess minor units come out of the smallest remainders, ties
/// from the highest index, skipping shares already at zero.
///
/// # Examples
///
/// ```rust
/// use splitty_core::{FixedDecimal, allocate};
///
/// let shares = allocate(FixedDecimal::new(1000, 2), 3, None).unwrap();
/// let rendered: Vec<String> = shares.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["3.34", "3.33", "3.33"]);
///
/// // 0.005 + 0.005 rounds to 0.02; the excess cent comes off the last share.
/// let shares = allocate(FixedDecimal::new(1, 2), 2, None).unwrap();
/// let rendered: Vec<String> = shares.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["0.01", "0.00"]);
/// ```
pub fn allocate(
    total: FixedDecimal,
    participant_count: usize,
    weights: Option<&[FixedDecimal]>,
) -> Result<Vec<FixedDecimal>, AllocationError> {
    if participant_count == 0 {
        return Err(AllocationError::InvalidParticipantCount {
            count: participant_count,
        });
    }
    if total.is_negative() {
        return Err(AllocationError::NegativeAmount {
            field: AmountField::Total,
            value: total,
        });
    }
    let (weights, weight_sum) = resolve_weights(participant_count, weights)?;

    let exact = weights
        .iter()
        .map(|weight| total.mul_div(*weight, weight_sum, EXACT_SCALE, Rounding::HalfUp))
        .collect::<Result<Vec<_>, _>>()?;
    let mut shares = exact
        .iter()
        .map(|share| share.round_currency())
        .collect::<Result<Vec<_>, _>>()?;

    let target = total.round_currency()?;
    let allocated = FixedDecimal::checked_sum(&shares, CURRENCY_SCALE)?;
    let drift = target.checked_sub(allocated)?;

    if !drift.is_zero() {
        distribute_drift(&mut shares, &exact, drift);
    }
    Ok(shares)
}

/// Splits a bill's subtotal, tax and tip between `participant_count`
/// participants. See [`allocate`].
pub fn allocate_bill(
    amounts: &BillAmounts,
    participant_count: usize,
    weights: Option<&[FixedDecimal]>,
) -> Result<Vec<FixedDecimal>, AllocationError> {
    allocate(amounts.total()?, participant_count, weights)
}

/// Validates the weights and brings them to a common scale.
///
/// Returns the effective weights and their sum.
fn resolve_weights(
    participant_count: usize,
    weights: Option<&[FixedDecimal]>,
) -> Result<(Vec<FixedDecimal>, FixedDecimal), AllocationError> {
    let Some(weights) = weights else {
        let uniform = vec![FixedDecimal::from_integer(1); participant_count];
        let sum = FixedDecimal::checked_sum(&uniform, 0)?;
        return Ok((uniform, sum));
    };

    if weights.len() != participant_count {
        return Err(AllocationError::WeightCountMismatch {
            expected: participant_count,
            actual: weights.len(),
        });
    }
    if let Some((index, weight)) = weights.iter().enumerate().find(|(_, w)| w.is_negative()) {
        return Err(AllocationError::NegativeAmount {
            field: AmountField::Weight(index),
            value: *weight,
        });
    }

    let scale = weights.iter().map(|w| w.scale()).max().unwrap_or(0);
    let weights = weights
        .iter()
        .map(|w| w.rescale(scale, Rounding::Down))
        .collect::<Result<Vec<_>, _>>()?;
    let sum = FixedDecimal::checked_sum(&weights, scale)?;
    if sum.is_zero() {
        return Err(AllocationError::DegenerateWeights);
    }
    Ok((weights, sum))
}

/// Moves `drift` (a multiple of the minor unit) into `shares`.
///
/// Positive drift goes first to the largest fractional remainders, ties to
/// the lowest index. Negative drift comes first out of the smallest
/// remainders, ties from the highest index, and never takes a share below
/// zero.
fn distribute_drift(shares: &mut [FixedDecimal], exact: &[FixedDecimal], drift: FixedDecimal) {
    let steps = drift.units().unsigned_abs();
    let adding = drift.is_positive();
    let unit = FixedDecimal::new(if adding { 1 } else { -1 }, CURRENCY_SCALE);

    let mut order: Vec<(usize, FixedDecimal)> = exact
        .iter()
        .map(|share| share.fract())
        .enumerate()
        .collect();
    if adding {
        order.sort_by(|(ia, ra), (ib, rb)| rb.cmp(ra).then(ia.cmp(ib)));
    } else {
        order.sort_by(|(ia, ra), (ib, rb)| ra.cmp(rb).then(ib.cmp(ia)));
    }

    tracing::trace!(%drift, %steps, "distributing rounding drift");

    // While the shares sum above a non-negative target, some share is positive,
    // so skipping zero shares cannot stall the walk.
    let mut applied = 0;
    for &(index, _) in order.iter().cycle() {
        if applied == steps {
            break;
        }
        if !adding && shares[index].is_zero() {
            continue;
        }
        shares[index] += unit;
        applied += 1;
    }
}
