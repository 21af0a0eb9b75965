//! Change-management collaborator
//!
//! Read-only: the workflow only lists pending change requests so an
//! attachment can reference one.

use crate::error::ChangeLookupError;
use dts_model::PendingChange;

/// Source of pending change requests
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChangeManagement: Send + Sync {
    /// List change requests awaiting approval
    async fn pending_changes(&self) -> Result<Vec<PendingChange>, ChangeLookupError>;
}

/// Fixed list of pending changes
#[derive(Debug, Clone)]
pub struct StaticChangeManagement {
    pending: Vec<PendingChange>,
}

impl StaticChangeManagement {
    /// Create with an explicit list
    #[inline]
    #[must_use]
    pub fn new(pending: Vec<PendingChange>) -> Self {
        Self { pending }
    }

    /// Create with no pending changes
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Default for StaticChangeManagement {
    fn default() -> Self {
        Self::new(vec![
            PendingChange::new(
                "CHG-2024-0142",
                "Update firewall rules for payment gateway",
                "Pending Approval",
            ),
            PendingChange::new(
                "CHG-2024-0156",
                "SD-WAN policy update for branch offices",
                "Pending Approval",
            ),
            PendingChange::new("CHG-2024-0161", "DNS migration to new provider", "In Review"),
        ])
    }
}

#[async_trait::async_trait]
impl ChangeManagement for StaticChangeManagement {
    async fn pending_changes(&self) -> Result<Vec<PendingChange>, ChangeLookupError> {
        Ok(self.pending.clone())
    }
}
