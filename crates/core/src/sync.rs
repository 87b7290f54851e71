//! Synchronization outcome constants and the per-day mapping tally.
//!
//! The tally implements the two-tier failure model: expected catalog-mapping
//! misses are accumulated per day and reported in the outcome, while anything
//! unexpected aborts the surrounding transaction entirely (handled by the
//! service layer).

use rust_decimal::Decimal;

/// A sync that created a new schedule aggregate.
pub const OPERATION_CREATE: &str = "create";

/// A sync that replaced the slots of an existing schedule aggregate.
pub const OPERATION_UPDATE: &str = "update";

/// All declared days were mapped to catalog slots.
pub const OUTCOME_SUCCESS: &str = "success";

/// A subset of declared days could not be mapped; the rest were committed.
pub const OUTCOME_PARTIAL: &str = "partial";

/// Running counts accumulated while mapping declared days to schedule slots.
#[derive(Debug, Default, Clone)]
pub struct MappingTally {
    pub processed: i32,
    pub created: i32,
    pub errored: i32,
    pub errors: Vec<String>,
}

impl MappingTally {
    /// Record a day that was successfully mapped to a catalog slot.
    pub fn record_created(&mut self) {
        self.processed += 1;
        self.created += 1;
    }

    /// Record a day whose turn/regime combination had no catalog entry.
    pub fn record_error(&mut self, message: String) {
        self.processed += 1;
        self.errored += 1;
        self.errors.push(message);
    }

    /// Final outcome: success only when no per-day errors were recorded.
    pub fn outcome(&self) -> &'static str {
        if self.errored == 0 {
            OUTCOME_SUCCESS
        } else {
            OUTCOME_PARTIAL
        }
    }

    /// Newline-joined error list, or `None` when every day mapped cleanly.
    pub fn joined_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("\n"))
        }
    }

    /// Human-readable summary for the sync result.
    pub fn summary_message(&self, operation: &str, synced_hours: Decimal) -> String {
        let mut message = format!(
            "{operation} completed: {}/{} days synchronized ({synced_hours} hours)",
            self.created, self.processed
        );
        if self.errored > 0 {
            message.push_str(&format!(" - {} errors", self.errored));
        }
        message
    }
}
