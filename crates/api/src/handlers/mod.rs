//! HTTP handlers, grouped by resource.

pub mod availability;
pub mod comparison;
pub mod health;
pub mod sync;
