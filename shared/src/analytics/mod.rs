//! Reporting computations over already-fetched records
//!
//! Everything here is pure and synchronous: callers load a snapshot, call
//! one of these functions and serialise the returned report.

pub mod dashboard;
pub mod readiness;
pub mod trends;

pub use dashboard::*;
pub use readiness::*;
pub use trends::*;

use rust_decimal::Decimal;

/// Relative change (in percent) that counts as a real movement
pub const TREND_THRESHOLD_PERCENT: Decimal = Decimal::TWO;

/// Outcome of comparing a recent value against a prior one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Change {
    Up(Decimal),
    Down(Decimal),
    Flat(Decimal),
    Insufficient,
}

/// Compare two window means using the shared threshold.
///
/// Missing windows and a zero prior value yield `Insufficient`.
pub(crate) fn compare_windows(recent: Option<Decimal>, prior: Option<Decimal>) -> Change {
    let (Some(recent), Some(prior)) = (recent, prior) else {
        return Change::Insufficient;
    };
    let Some(change) = percentage_change(recent, prior) else {
        return Change::Insufficient;
    };

    if change > TREND_THRESHOLD_PERCENT {
        Change::Up(change)
    } else if change < -TREND_THRESHOLD_PERCENT {
        Change::Down(change)
    } else {
        Change::Flat(change)
    }
}

/// `(recent - prior) / prior * 100`, rounded to two decimals.
///
/// `None` when prior is zero or the result does not fit a `Decimal`.
pub fn percentage_change(recent: Decimal, prior: Decimal) -> Option<Decimal> {
    if prior.is_zero() {
        return None;
    }
    let ratio = recent.checked_sub(prior)?.checked_div(prior)?;
    Some(ratio.checked_mul(Decimal::ONE_HUNDRED)?.round_dp(2))
}

/// Arithmetic mean, `None` for an empty input or when the sum overflows
pub(crate) fn mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut sum = Decimal::ZERO;
    let mut count = 0u32;
    for value in values {
        let Some(next) = sum.checked_add(value) else {
            tracing::warn!(samples = count + 1, "metric sum overflowed; dropping mean");
            return None;
        };
        sum = next;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    sum.checked_div(Decimal::from(count))
}
