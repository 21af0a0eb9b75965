//! Workflow configuration
//!
//! Loadable from TOML; every field has a default:
//!
//! ```toml
//! operator = "jane.doe"
//! approvers = ["sarah.johnson", "michael.chen"]
//! record_history = false
//!
//! [engine]
//! tick_interval_ms = 200
//! min_step = 1
//! max_step = 5
//! ```

use crate::error::ConfigError;
use dts_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Approvers available when none are configured
pub const DEFAULT_APPROVERS: [&str; 5] = [
    "sarah.johnson",
    "michael.chen",
    "alex.rodriguez",
    "emily.davis",
    "david.kim",
];

/// Workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// User recorded on history entries
    pub operator: String,
    /// Fixed approver roster for attachments
    pub approvers: Vec<String>,
    /// Append finished runs to the history ledger (off by default)
    pub record_history: bool,
    /// Simulation engine settings
    pub engine: EngineConfig,
}

impl WorkflowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With operator name
    #[inline]
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// With approver roster
    #[inline]
    #[must_use]
    pub fn with_approvers<I, S>(mut self, approvers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.approvers = approvers.into_iter().map(Into::into).collect();
        self
    }

    /// With history recording on or off
    #[inline]
    #[must_use]
    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// With engine settings
    #[inline]
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Whether `name` is on the approver roster
    #[must_use]
    pub fn is_approver(&self, name: &str) -> bool {
        self.approvers.iter().any(|a| a == name)
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.approvers.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid("approver roster is empty".to_string()));
        }
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            operator: "current.user".to_string(),
            approvers: DEFAULT_APPROVERS.iter().map(|a| (*a).to_string()).collect(),
            record_history: false,
            engine: EngineConfig::default(),
        }
    }
}
