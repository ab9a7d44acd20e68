//! Common utility functions for pricing calculations.
//!
//! This module provides shared functionality used across multiple
//! calculators, including rounding, percentage math and period projections.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Months in a quarter, used for quarterly projections.
pub const MONTHS_PER_QUARTER: u32 = 3;

/// Months in half a year.
pub const MONTHS_PER_HALF_YEAR: u32 = 6;

/// Months in a year, used for annual projections.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fulfill_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent` percent of `value`, or `None` if it overflows.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use fulfill_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(200), dec!(8)), Some(dec!(16)));
/// ```
pub fn percent_of(
    value: Decimal,
    percent: Decimal,
) -> Option<Decimal> {
    value.checked_mul(percent)?.checked_div(Decimal::ONE_HUNDRED)
}

/// Expresses `part` as a percentage of `whole`, or zero when `whole` is not positive.
pub fn ratio_percent(
    part: Decimal,
    whole: Decimal,
) -> Option<Decimal> {
    if whole > Decimal::ZERO {
        part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Rounds `value` up to the next multiple of `step`.
///
/// A non-positive `step` returns `value` unchanged.
pub fn ceil_to_step(
    value: Decimal,
    step: Decimal,
) -> Option<Decimal> {
    if step <= Decimal::ZERO {
        return Some(value);
    }
    value.checked_div(step)?.ceil().checked_mul(step)
}

/// Adds up `values`, or `None` once the running total leaves `Decimal`'s range.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Monthly cost extended to longer periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub monthly: Decimal,
    pub quarterly: Decimal,
    pub half_year: Decimal,
    pub annual: Decimal,
}

impl Projection {
    /// `None` when the annual figure does not fit in a `Decimal`.
    pub fn from_monthly(monthly: Decimal) -> Option<Self> {
        let months = |n: u32| monthly.checked_mul(Decimal::from(n));
        Some(Self {
            monthly,
            quarterly: months(MONTHS_PER_QUARTER)?,
            half_year: months(MONTHS_PER_HALF_YEAR)?,
            annual: months(MONTHS_PER_YEAR)?,
        })
    }
}
