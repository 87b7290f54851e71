use std::sync::Arc;

use telestaff_service::audit::TracingAuditSink;
use telestaff_service::{AvailabilityService, ComparisonService, SyncService};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: telestaff_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Availability declaration workflow.
    pub availability: Arc<AvailabilityService>,
    /// Schedule synchronization.
    pub sync: Arc<SyncService>,
    /// Period comparison reporting.
    pub comparison: Arc<ComparisonService>,
}

impl AppState {
    /// Wire the service layer onto a pool with the default audit sink.
    pub fn new(pool: telestaff_db::DbPool, config: ServerConfig) -> Self {
        let audit = Arc::new(TracingAuditSink);
        AppState {
            availability: Arc::new(AvailabilityService::new(pool.clone(), audit.clone())),
            sync: Arc::new(SyncService::new(pool.clone(), audit)),
            comparison: Arc::new(ComparisonService::new(pool.clone())),
            config: Arc::new(config),
            pool,
        }
    }
}
