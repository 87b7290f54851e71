//! Audit event emission.
//!
//! The audit store is an external collaborator; the services emit events
//! through a narrow sink trait so the transport can be swapped without
//! touching workflow code. The default sink writes structured tracing
//! records for the log pipeline to pick up.

use serde::Serialize;
use telestaff_core::types::DbId;

/// One audit event: who did what to which record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: &'static str,
    pub entity: &'static str,
    pub entity_id: DbId,
    pub actor: String,
    pub detail: serde_json::Value,
}

/// Destination for audit events. Emission must never fail the operation
/// being audited, so the sink is infallible.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits audit events as structured tracing records.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            action = event.action,
            entity = event.entity,
            entity_id = event.entity_id,
            actor = %event.actor,
            detail = %event.detail,
            "audit"
        );
    }
}

/// Discards events; used in tests.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: AuditEvent) {}
}
