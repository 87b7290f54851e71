//! Pure domain logic for the telestaff availability and schedule
//! synchronization platform.
//!
//! This crate has no database or transport dependencies so it can be used
//! by the repository layer, the service layer, and any future CLI tooling.

pub mod audit;
pub mod availability;
pub mod error;
pub mod hours;
pub mod schedule;
pub mod sync;
pub mod types;
