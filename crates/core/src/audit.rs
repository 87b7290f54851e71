//! Audit action constants.
//!
//! Lives in `core` (zero internal deps) so both the service layer and any
//! future tooling agree on action names. The audit store itself is an
//! external collaborator; this crate only names the events.

/// Known action types for availability and synchronization audit events.
pub mod actions {
    pub const AVAILABILITY_CREATE: &str = "availability_create";
    pub const AVAILABILITY_UPDATE: &str = "availability_update";
    pub const AVAILABILITY_SUBMIT: &str = "availability_submit";
    pub const AVAILABILITY_REVIEW: &str = "availability_review";
    pub const AVAILABILITY_ADJUST: &str = "availability_adjust";
    pub const AVAILABILITY_DELETE: &str = "availability_delete";
    pub const SCHEDULE_SYNC: &str = "schedule_sync";
    pub const SCHEDULE_RESYNC: &str = "schedule_resync";
}

/// Entity type label used on every audit event emitted by this subsystem.
pub const ENTITY_AVAILABILITY: &str = "availability";
