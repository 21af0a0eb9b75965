//! Error types for the DTS workflow
//!
//! Every condition here is handled by the stage that detects it:
//! - Missing configuration blocks the run stage
//! - Malformed persisted configuration degrades to "no configuration"
//! - Invalid attachment submissions are rejected without side effects
//! - Failed runs leave the configuration in place for a retry

use crate::stage::Stage;
use dts_engine::EngineError;
use dts_model::{FailureReason, ModelError, RecordId};
use std::path::PathBuf;

/// Main workflow error type
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Run requested with no saved configuration
    #[error("no configuration saved; save a configuration before starting a run")]
    MissingConfiguration,

    /// A run is already in flight
    #[error("a simulation is already running")]
    AlreadyRunning,

    /// Operation needs an in-flight run
    #[error("no simulation is running")]
    NotRunning,

    /// Stage gated by the current state
    #[error("stage '{stage}' is not reachable while {state}")]
    StageUnreachable { stage: Stage, state: &'static str },

    /// Run reached the failed terminal state
    #[error("simulation failed: {0}")]
    RunFailed(FailureReason),

    /// Configuration store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Engine refused the run
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Attachment submission rejected
    #[error("attachment rejected: {0}")]
    Attachment(#[from] AttachmentError),

    /// History ledger error
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// Workflow configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl WorkflowError {
    /// Whether the user can fix this from the current stage
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingConfiguration
            | Self::AlreadyRunning
            | Self::NotRunning
            | Self::StageUnreachable { .. }
            | Self::RunFailed(_)
            | Self::Attachment(_)
            | Self::History(_) => true,
            Self::Engine(EngineError::AlreadyRunning(_)) => true,
            Self::Store(_) | Self::Engine(_) | Self::Config(_) => false,
        }
    }
}

/// Configuration store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] ModelError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Change-management lookup failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("change management unavailable: {0}")]
pub struct ChangeLookupError(pub String);

/// Attachment validation errors
///
/// Names the first rule the submission broke.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// No current result to attach
    #[error("no simulation result to attach")]
    NoResult,

    /// Summary is empty or whitespace
    #[error("a change summary is required")]
    EmptySummary,

    /// No approver selected
    #[error("an approver is required")]
    MissingApprover,

    /// Approver not on the roster
    #[error("'{0}' is not an approver")]
    UnknownApprover(String),

    /// Existing change selected without an id
    #[error("select the change request to attach to")]
    MissingChangeId,

    /// Change id is not a pending change
    #[error("'{0}' is not a pending change request")]
    UnknownChangeId(String),

    /// Pending changes could not be listed
    #[error(transparent)]
    ChangeLookup(#[from] ChangeLookupError),
}

/// History ledger errors
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// No record with this id
    #[error("history record {0} not found")]
    NotFound(RecordId),
}

/// Workflow configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are individually valid but unusable together
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_error_display() {
        let err = WorkflowError::StageUnreachable {
            stage: Stage::Attach,
            state: "running",
        };
        assert_eq!(err.to_string(), "stage 'attach' is not reachable while running");
    }

    #[test]
    fn recoverable_errors() {
        assert!(WorkflowError::MissingConfiguration.is_recoverable());
        assert!(WorkflowError::Attachment(AttachmentError::EmptySummary).is_recoverable());
        assert!(!WorkflowError::Config(ConfigError::Invalid("x".to_string())).is_recoverable());
        assert!(!WorkflowError::Store(StoreError::io_error(
            "/tmp/x",
            std::io::Error::other("disk full")
        ))
        .is_recoverable());
    }

    #[test]
    fn attachment_error_from_lookup() {
        let err: AttachmentError = ChangeLookupError("timeout".to_string()).into();
        assert_eq!(err.to_string(), "change management unavailable: timeout");
    }
}
