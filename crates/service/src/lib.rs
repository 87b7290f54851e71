//! Service layer: workflow rules, synchronization, and comparison reporting
//! on top of the repository layer.

pub mod actor;
pub mod audit;
pub mod availability;
pub mod comparison;
pub mod error;
pub mod sync;

pub use actor::{Actor, Role};
pub use availability::AvailabilityService;
pub use comparison::ComparisonService;
pub use error::ServiceError;
pub use sync::SyncService;
