//! Change-request attachments
//!
//! An attachment binds a snapshot of a [`SimulationResult`] to a new or an
//! existing change request. It is immutable once created: fields are only
//! readable through accessors.

use crate::error::ModelError;
use crate::ids::AttachmentId;
use crate::result::SimulationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Whether the attachment opens a new change or joins a pending one
    pub enum ChangeType {
        New => "new",
        Existing => "existing",
    }
}

/// Target change request
///
/// Carries the change id exactly when the target is an existing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
    /// Open a new change request
    New,
    /// Attach to a pending change request
    Existing { change_id: String },
}

impl ChangeTarget {
    /// Wire change type
    #[inline]
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeTarget::New => ChangeType::New,
            ChangeTarget::Existing { .. } => ChangeType::Existing,
        }
    }

    /// Referenced change id, if any
    #[inline]
    #[must_use]
    pub fn change_id(&self) -> Option<&str> {
        match self {
            ChangeTarget::New => None,
            ChangeTarget::Existing { change_id } => Some(change_id),
        }
    }
}

/// A simulation result attached to a change request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AttachmentRecord")]
pub struct ChangeRequestAttachment {
    id: AttachmentId,
    change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    change_id: Option<String>,
    summary: String,
    approver: String,
    result_snapshot: SimulationResult,
    created_at: DateTime<Utc>,
}

impl ChangeRequestAttachment {
    /// Create attachment
    ///
    /// Field validation (non-empty summary, roster approver, pending change
    /// id) belongs to the caller; this only fixes the shape.
    #[must_use]
    pub fn new(
        target: ChangeTarget,
        summary: impl Into<String>,
        approver: impl Into<String>,
        result_snapshot: SimulationResult,
    ) -> Self {
        Self {
            id: AttachmentId::new(),
            change_type: target.change_type(),
            change_id: target.change_id().map(str::to_string),
            summary: summary.into(),
            approver: approver.into(),
            result_snapshot,
            created_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    #[inline]
    #[must_use]
    pub fn change_id(&self) -> Option<&str> {
        self.change_id.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[inline]
    #[must_use]
    pub fn approver(&self) -> &str {
        &self.approver
    }

    /// Result as it was when attached
    #[inline]
    #[must_use]
    pub fn result_snapshot(&self) -> &SimulationResult {
        &self.result_snapshot
    }

    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Decoded attachment, checked before it becomes a [`ChangeRequestAttachment`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRecord {
    id: AttachmentId,
    change_type: ChangeType,
    #[serde(default)]
    change_id: Option<String>,
    summary: String,
    approver: String,
    result_snapshot: SimulationResult,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttachmentRecord> for ChangeRequestAttachment {
    type Error = ModelError;

    fn try_from(record: AttachmentRecord) -> Result<Self, Self::Error> {
        let has_id = record
            .change_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        match (record.change_type, has_id) {
            (ChangeType::New, false) | (ChangeType::Existing, true) => {}
            (ChangeType::New, true) => {
                return Err(ModelError::InconsistentAttachment(
                    "a new change request carries no change id",
                ))
            }
            (ChangeType::Existing, false) => {
                return Err(ModelError::InconsistentAttachment(
                    "an existing change request needs a change id",
                ))
            }
        }

        Ok(Self {
            id: record.id,
            change_type: record.change_type,
            change_id: record.change_id,
            summary: record.summary,
            approver: record.approver,
            result_snapshot: record.result_snapshot,
            created_at: record.created_at,
        })
    }
}
