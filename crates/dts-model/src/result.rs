//! Simulation results and failure reasons
//!
//! [`SimulationResult`] is the object handed from the controller to every
//! result consumer. Its JSON form is
//! `{riskScore, configDiff: {added, removed, modified}, affectedServices: [{name, impact}], criticalIssues, warnings, timestamp}`.

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Impact of a change on one service
    pub enum Impact {
        None => "none",
        Minor => "minor",
        Major => "major",
    }
}

/// Line-level change counts between the live and tested configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub added: u32,
    pub removed: u32,
    pub modified: u32,
}

impl ConfigDiff {
    /// Create diff counts
    #[inline]
    #[must_use]
    pub fn new(added: u32, removed: u32, modified: u32) -> Self {
        Self {
            added,
            removed,
            modified,
        }
    }

    /// Total number of changed lines
    #[inline]
    #[must_use]
    pub fn total(&self) -> u32 {
        self.added
            .saturating_add(self.removed)
            .saturating_add(self.modified)
    }
}

/// A service touched by the tested change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedService {
    pub name: String,
    pub impact: Impact,
}

impl AffectedService {
    /// Create affected service entry
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, impact: Impact) -> Self {
        Self {
            name: name.into(),
            impact,
        }
    }
}

/// Outcome of a completed simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// 0-100, higher is safer
    pub risk_score: u8,
    pub config_diff: ConfigDiff,
    /// Ordered as reported by the analysis
    pub affected_services: Vec<AffectedService>,
    pub critical_issues: u32,
    pub warnings: u32,
    /// Completion instant
    pub timestamp: DateTime<Utc>,
}

impl SimulationResult {
    /// Create a result with no affected services, stamped now
    #[inline]
    #[must_use]
    pub fn new(risk_score: u8, config_diff: ConfigDiff) -> Self {
        Self {
            risk_score,
            config_diff,
            affected_services: Vec::new(),
            critical_issues: 0,
            warnings: 0,
            timestamp: Utc::now(),
        }
    }

    /// With affected services
    #[inline]
    #[must_use]
    pub fn with_services(mut self, services: Vec<AffectedService>) -> Self {
        self.affected_services = services;
        self
    }

    /// With issue counts
    #[inline]
    #[must_use]
    pub fn with_issues(mut self, critical_issues: u32, warnings: u32) -> Self {
        self.critical_issues = critical_issues;
        self.warnings = warnings;
        self
    }

    /// With explicit completion timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.risk_score > 100 {
            return Err(ModelError::RiskOutOfRange(self.risk_score));
        }
        Ok(())
    }

    /// Services with a major impact
    pub fn major_impacts(&self) -> impl Iterator<Item = &AffectedService> {
        self.affected_services
            .iter()
            .filter(|s| s.impact == Impact::Major)
    }

    /// Services with a minor impact
    pub fn minor_impacts(&self) -> impl Iterator<Item = &AffectedService> {
        self.affected_services
            .iter()
            .filter(|s| s.impact == Impact::Minor)
    }
}

wire_enum! {
    /// Where a run failed
    pub enum FailureKind {
        /// The analysis strategy rejected or could not process the run
        Analysis => "analysis",
        /// The engine itself stopped before producing a result
        Engine => "engine",
    }
}

/// Typed reason a run reached the failed terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    /// Analysis failure
    #[inline]
    #[must_use]
    pub fn analysis(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Analysis,
            message: message.into(),
        }
    }

    /// Engine failure
    #[inline]
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Engine,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}
