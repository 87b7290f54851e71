//! Caller identity for service operations.
//!
//! Identity is resolved upstream (gateway / session layer); the services
//! only need the numeric ID and the role to enforce ownership rules.

use serde::{Deserialize, Serialize};
use telestaff_core::error::CoreError;
use telestaff_core::types::DbId;

/// Role of the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A medical professional; may only act on their own records.
    Professional,
    /// A staffing coordinator; reviews, adjusts, and synchronizes.
    Coordinator,
    /// Full access.
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "professional" => Ok(Role::Professional),
            "coordinator" => Ok(Role::Coordinator),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Professional => "professional",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
        }
    }
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: DbId, role: Role) -> Self {
        Actor { id, role }
    }

    /// Coordinators and admins act across all professionals.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Coordinator | Role::Admin)
    }

    /// Whether this actor may read or mutate records owned by the given
    /// professional.
    pub fn can_access(&self, professional_id: DbId) -> bool {
        self.is_staff() || self.id == professional_id
    }

    /// Require access to records of the given professional.
    pub fn ensure_access(&self, professional_id: DbId) -> Result<(), CoreError> {
        if self.can_access(professional_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Professionals may only act on their own availability records".to_string(),
            ))
        }
    }

    /// Require a staff role (coordinator or admin).
    pub fn ensure_staff(&self) -> Result<(), CoreError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Operation requires a coordinator or admin role".to_string(),
            ))
        }
    }

    /// Stable label recorded in audit and sync log entries.
    pub fn label(&self) -> String {
        format!("{}:{}", self.role.as_str(), self.id)
    }
}
