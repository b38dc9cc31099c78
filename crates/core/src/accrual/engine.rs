//! Accrual delta computation.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::entitlement::Entitlement;
use crate::policy::LeavePolicy;

/// Result of an accrual computation.
///
/// `delta` is unrounded; rounding applies to the cumulative figure when the
/// outcome is folded into the entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualOutcome {
    /// Days earned since the anchors, before rounding.
    pub delta: Decimal,
    /// Monthly anchor advanced by the whole months consumed.
    pub new_last_accrual_date: NaiveDate,
    /// Yearly anchor advanced by the whole years consumed.
    pub new_last_yearly_accrual_date: NaiveDate,
}

/// Stateless engine computing periodic accrual from a policy and an
/// entitlement's accrual anchors.
///
/// Anchors only advance by the whole months or years actually consumed, so
/// a partial month is retained and picked up by a later run. Re-running
/// with the same `as_of` and unchanged anchors yields a zero delta.
pub struct AccrualEngine;

impl AccrualEngine {
    /// Computes the accrual earned between the entitlement's anchors and `as_of`.
    #[must_use]
    pub fn compute_accrual(
        entitlement: &Entitlement,
        policy: &LeavePolicy,
        as_of: NaiveDate,
    ) -> AccrualOutcome {
        let mut delta = Decimal::ZERO;
        let mut new_last_accrual_date = entitlement.last_accrual_date();
        let mut new_last_yearly_accrual_date = entitlement.last_yearly_accrual_date();

        if policy.accrual_method.accrues_monthly() {
            let months = whole_months_between(new_last_accrual_date, as_of);
            if months > 0 {
                delta += policy.monthly_rate * Decimal::from(months);
                new_last_accrual_date = add_months(new_last_accrual_date, months);
            }
        }

        if policy.accrual_method.accrues_yearly() {
            let years = whole_months_between(new_last_yearly_accrual_date, as_of) / 12;
            if years > 0 {
                delta += policy.yearly_rate * Decimal::from(years);
                new_last_yearly_accrual_date = add_months(new_last_yearly_accrual_date, years * 12);
            }
        }

        AccrualOutcome {
            delta,
            new_last_accrual_date,
            new_last_yearly_accrual_date,
        }
    }
}

/// Number of whole calendar months between two dates.
///
/// A month counts once `from` advanced by that many months (with month-end
/// clamping) does not pass `to`. Returns 0 when `to` is not after `from`.
#[must_use]
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }

    let span = (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    let Ok(mut months) = u32::try_from(span) else {
        return 0;
    };

    while months > 0 && add_months(from, months) > to {
        months -= 1;
    }
    months
}

/// Advances a date by whole months, clamping to month end.
pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
