//! Half-day rounding of accrued balances.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::policy::RoundingRule;

/// Rounds a day quantity to half-day granularity per the policy rule.
///
/// Rounding always applies to the cumulative accrued figure, never to an
/// individual delta, so remainders are preserved across accrual runs.
#[must_use]
pub fn round_days(value: Decimal, rule: RoundingRule) -> Decimal {
    match rule {
        RoundingRule::None => value,
        RoundingRule::Up => (value * Decimal::TWO).ceil() / Decimal::TWO,
        RoundingRule::Down => (value * Decimal::TWO).floor() / Decimal::TWO,
        RoundingRule::NearestHalf => (value * Decimal::TWO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            / Decimal::TWO,
    }
}
