//! Rows served by the external change-management system

use serde::{Deserialize, Serialize};

/// A pending change request that a result may be attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub id: String,
    pub title: String,
    pub status: String,
}

impl PendingChange {
    /// Create pending change row
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: status.into(),
        }
    }
}
