//! Hour calculation engine: (labor regime, turn code) -> hours.
//!
//! The conversion table is fixed by labor-contract rules and is the single
//! source of truth for committed-hours arithmetic. Kept free of side effects
//! so the DB and service layers can recompute totals anywhere.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreError;

/// A declared shift marker for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnCode {
    /// Morning shift.
    M,
    /// Afternoon shift.
    T,
    /// Full day (morning + afternoon).
    Mt,
}

impl TurnCode {
    /// All valid turn code string values.
    pub const VALID: &'static [&'static str] = &["M", "T", "MT"];

    /// Parse a turn code string, failing with a validation error on
    /// anything other than `M`, `T`, or `MT`.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "M" => Ok(TurnCode::M),
            "T" => Ok(TurnCode::T),
            "MT" => Ok(TurnCode::Mt),
            other => Err(CoreError::Validation(format!(
                "Invalid turn code '{other}'. Must be one of: {}",
                Self::VALID.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnCode::M => "M",
            TurnCode::T => "T",
            TurnCode::Mt => "MT",
        }
    }
}

/// Labor-contract family, determining the hour-per-turn conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeFamily {
    /// Contract types billed in 4/8-hour blocks (labels containing `728` or `CAS`).
    Hourly,
    /// Contractor regimes billed in 6/12-hour blocks (labels containing `LOCADOR`).
    Contractor,
}

impl RegimeFamily {
    /// Resolve a regime family from a free-text regime label.
    ///
    /// Returns `None` when the label matches neither known family; callers
    /// decide whether that is a fallback or an error.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.to_uppercase();
        if upper.contains("728") || upper.contains("CAS") {
            Some(RegimeFamily::Hourly)
        } else if upper.contains("LOCADOR") {
            Some(RegimeFamily::Contractor)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeFamily::Hourly => "hourly",
            RegimeFamily::Contractor => "contractor",
        }
    }
}

/// Hours for one declared turn under the given regime family.
///
/// Hourly: M=4, T=4, MT=8. Contractor: M=6, T=6, MT=12.
pub fn turn_hours(family: RegimeFamily, turn: TurnCode) -> Decimal {
    match (family, turn) {
        (RegimeFamily::Hourly, TurnCode::M | TurnCode::T) => dec!(4.00),
        (RegimeFamily::Hourly, TurnCode::Mt) => dec!(8.00),
        (RegimeFamily::Contractor, TurnCode::M | TurnCode::T) => dec!(6.00),
        (RegimeFamily::Contractor, TurnCode::Mt) => dec!(12.00),
    }
}

/// Hours for one declared turn, resolving the family from a regime label.
///
/// An unrecognized label falls back to the Hourly table with a warning;
/// it never fails the caller. An invalid turn code is still an error.
pub fn hours_for_label(regime_label: &str, turn: TurnCode) -> Decimal {
    let family = match RegimeFamily::from_label(regime_label) {
        Some(family) => family,
        None => {
            tracing::warn!(
                regime = %regime_label,
                "Unrecognized labor regime, falling back to hourly table"
            );
            RegimeFamily::Hourly
        }
    };
    turn_hours(family, turn)
}
