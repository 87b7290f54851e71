//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction for multi-step operations)
//! as the first argument.

pub mod availability_repo;
pub mod catalog_repo;
pub mod schedule_repo;
pub mod sync_log_repo;

pub use availability_repo::AvailabilityRepo;
pub use catalog_repo::{ProfessionalRepo, SlotCatalogRepo, WorkAreaRepo};
pub use schedule_repo::ScheduleRepo;
pub use sync_log_repo::SyncLogRepo;
