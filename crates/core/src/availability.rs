//! Availability workflow states, transition rules, and committed-hours
//! validation.
//!
//! The workflow is strictly forward: draft -> submitted -> reviewed ->
//! synchronized. The only backward edge is synchronized -> reviewed, taken
//! explicitly through a forced resync.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
State constants
-------------------------------------------------------------------------- */

/// Record is being built by the professional and may be freely edited.
pub const STATE_DRAFT: &str = "draft";

/// Record was submitted for coordinator review.
pub const STATE_SUBMITTED: &str = "submitted";

/// Record was reviewed by a coordinator and is eligible for synchronization.
pub const STATE_REVIEWED: &str = "reviewed";

/// Record was materialized into schedule slots.
pub const STATE_SYNCHRONIZED: &str = "synchronized";

/// All valid workflow state values.
pub const VALID_STATES: &[&str] = &[
    STATE_DRAFT,
    STATE_SUBMITTED,
    STATE_REVIEWED,
    STATE_SYNCHRONIZED,
];

/// Monthly minimum of committed hours a professional must declare.
pub const REQUIRED_HOURS: Decimal = dec!(150.00);

/// Absolute declared-vs-synchronized difference above which a period summary
/// row is flagged inconsistent.
pub const COMPARISON_TOLERANCE_HOURS: Decimal = dec!(1.0);

/* --------------------------------------------------------------------------
Transition checks
-------------------------------------------------------------------------- */

/// Require a record to be in the given state.
pub fn ensure_state(current: &str, required: &'static str) -> Result<(), CoreError> {
    if current == required {
        Ok(())
    } else {
        Err(CoreError::state_violation(current, required))
    }
}

/// Whether a record in this state may still be edited or deleted by the
/// owning professional.
pub fn is_editable(state: &str) -> bool {
    state == STATE_DRAFT
}

/* --------------------------------------------------------------------------
Hour-threshold validation
-------------------------------------------------------------------------- */

/// Hours still missing to reach [`REQUIRED_HOURS`], or `None` when the
/// minimum is met.
pub fn hours_deficit(total_hours: Decimal) -> Option<Decimal> {
    if total_hours >= REQUIRED_HOURS {
        None
    } else {
        Some(REQUIRED_HOURS - total_hours)
    }
}

/// Fulfillment percentage against the required minimum, rounded to two
/// decimal places.
pub fn fulfillment_pct(total_hours: Decimal) -> Decimal {
    ((total_hours / REQUIRED_HOURS) * dec!(100)).round_dp(2)
}

/// Validate a submission: at least one declared day and the hour minimum met.
///
/// The returned error carries the exact deficit so the caller can surface it.
pub fn validate_submission(day_count: usize, total_hours: Decimal) -> Result<(), CoreError> {
    if day_count == 0 {
        return Err(CoreError::Validation(
            "Cannot submit an availability with no declared days".to_string(),
        ));
    }
    if let Some(deficit) = hours_deficit(total_hours) {
        return Err(CoreError::Validation(format!(
            "Cannot submit: {deficit} hours short of the {REQUIRED_HOURS} hour minimum"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Period validation
-------------------------------------------------------------------------- */

/// Validate a period key: six digits, `YYYYMM`, month 01-12.
pub fn validate_period(period: &str) -> Result<(), CoreError> {
    if period.len() != 6 || !period.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Invalid period '{period}'. Expected YYYYMM"
        )));
    }
    let month: u32 = period[4..].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "Invalid period '{period}'. Month must be 01-12"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
