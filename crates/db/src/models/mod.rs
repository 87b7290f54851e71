pub mod availability;
pub mod catalog;
pub mod schedule;
pub mod sync_log;
