//! Turn-code to catalog-slot-code mapping and comparison tolerance logic.

use rust_decimal::Decimal;

use crate::availability::COMPARISON_TOLERANCE_HOURS;
use crate::hours::TurnCode;

/// Catalog slot code for a morning turn.
pub const SLOT_CODE_MORNING: &str = "158";

/// Catalog slot code for an afternoon turn.
pub const SLOT_CODE_AFTERNOON: &str = "131";

/// Catalog slot code for a full-day turn.
pub const SLOT_CODE_FULL_DAY: &str = "200A";

/// Shift-type marker stamped on every slot produced by synchronization, so
/// the booking front end can tell synchronized slots from manually entered
/// ones.
pub const SHIFT_TYPE_BOOKING: &str = "TRN_BOOKING";

/// Map a declared turn to its catalog schedule-slot code.
///
/// This is a fixed three-entry table. If additional turn codes or regime
/// families are ever introduced, it must be deliberately extended; nothing
/// here infers behavior beyond the three documented codes.
pub fn slot_code(turn: TurnCode) -> &'static str {
    match turn {
        TurnCode::M => SLOT_CODE_MORNING,
        TurnCode::T => SLOT_CODE_AFTERNOON,
        TurnCode::Mt => SLOT_CODE_FULL_DAY,
    }
}

/// Whether a declared-vs-synchronized hour pair falls outside the one-hour
/// tolerance band.
pub fn is_inconsistent(declared_hours: Decimal, synchronized_hours: Decimal) -> bool {
    let diff = (declared_hours - synchronized_hours).abs();
    diff > COMPARISON_TOLERANCE_HOURS
}
