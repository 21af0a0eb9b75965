//! History ledger records

use crate::config::ConfigType;
use crate::ids::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Review status of a past run
    pub enum HistoryStatus {
        Approved => "Approved",
        Pending => "Pending",
        Failed => "Failed",
        InReview => "In Review",
    }
}

/// Summary of one past simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: RecordId,
    pub timestamp: DateTime<Utc>,
    pub config_type: ConfigType,
    pub risk_score: u8,
    pub user: String,
    pub status: HistoryStatus,
    /// Human-readable description of each critical issue
    pub critical_issues: Vec<String>,
}

impl HistoryRecord {
    /// Create record with a fresh id, stamped now, with no issues
    #[inline]
    #[must_use]
    pub fn new(
        config_type: ConfigType,
        risk_score: u8,
        user: impl Into<String>,
        status: HistoryStatus,
    ) -> Self {
        Self {
            id: RecordId::new(),
            timestamp: Utc::now(),
            config_type,
            risk_score: risk_score.min(100),
            user: user.into(),
            status,
            critical_issues: Vec::new(),
        }
    }

    /// With critical issue descriptions
    #[inline]
    #[must_use]
    pub fn with_issues<I, S>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.critical_issues = issues.into_iter().map(Into::into).collect();
        self
    }

    /// With explicit timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// With explicit identifier
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }
}
