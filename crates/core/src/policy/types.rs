//! Leave policy domain types.
//!
//! A policy describes how balance builds up for one leave type (accrual
//! method, rates, carry-forward rules) and what a valid request against it
//! looks like (minimum duration, consecutive-day cap, attachment rule).

use absentia_shared::types::LeaveTypeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How balance accrues over time for a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualMethod {
    /// No periodic accrual; the yearly grant is all there is.
    None,
    /// A fixed rate per whole calendar month.
    Monthly,
    /// A fixed rate per whole policy year.
    Yearly,
    /// Monthly and yearly accrual combined.
    Hybrid,
}

impl AccrualMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Returns true if the method has a monthly component.
    #[must_use]
    pub fn accrues_monthly(&self) -> bool {
        matches!(self, Self::Monthly | Self::Hybrid)
    }

    /// Returns true if the method has a yearly component.
    #[must_use]
    pub fn accrues_yearly(&self) -> bool {
        matches!(self, Self::Yearly | Self::Hybrid)
    }
}

impl fmt::Display for AccrualMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the cumulative accrued figure is rounded.
///
/// Leave balances are kept in half-day granularity, so every rule rounds to
/// a multiple of 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// No rounding; the raw accrued figure is used as-is.
    None,
    /// Ceiling to the next half day.
    Up,
    /// Floor to the previous half day.
    Down,
    /// Nearest half day, ties away from zero.
    NearestHalf,
}

impl RoundingRule {
    /// Returns the string representation of the rule.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Up => "up",
            Self::Down => "down",
            Self::NearestHalf => "nearest_half",
        }
    }

    /// Parses a rule from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "nearest_half" => Some(Self::NearestHalf),
            _ => None,
        }
    }
}

impl fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy record for one leave type.
///
/// Owned by configuration management; the core only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// The leave type this policy applies to.
    pub leave_type_id: LeaveTypeId,
    /// Human-readable name (e.g., "Annual Leave").
    pub name: String,
    /// How balance accrues over time.
    pub accrual_method: AccrualMethod,
    /// Days accrued per whole month (monthly/hybrid methods).
    pub monthly_rate: Decimal,
    /// Days accrued per whole policy year (yearly/hybrid methods).
    pub yearly_rate: Decimal,
    /// Whether unconsumed balance rolls into the next period.
    pub carry_forward_allowed: bool,
    /// Cap on the rolled-over balance.
    pub max_carry_forward: Decimal,
    /// Months after which a carried-forward balance expires, if any.
    pub carry_forward_expiry_months: Option<u32>,
    /// Rounding applied to the cumulative accrued figure.
    pub rounding_rule: RoundingRule,
    /// Minimum duration of a single request, in days.
    pub min_request_days: Decimal,
    /// Maximum consecutive days per request, if capped.
    pub max_consecutive_days: Option<Decimal>,
    /// Whether a request must reference a supporting attachment.
    pub requires_attachment: bool,
}
