//! Simulation run bookkeeping

use crate::config::TestConfiguration;
use crate::ids::RunId;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Lifecycle of a single run
    pub enum RunStatus {
        Idle => "idle",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

/// One execution attempt against a configuration snapshot
///
/// Progress only moves forward while running and ends at exactly 100 on
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub id: RunId,
    pub status: RunStatus,
    pub progress_percent: u8,
    /// Configuration active when the run started; never mutated afterwards
    pub config_snapshot: TestConfiguration,
}

impl SimulationRun {
    /// Create an idle run over a snapshot
    #[inline]
    #[must_use]
    pub fn new(id: RunId, config_snapshot: TestConfiguration) -> Self {
        Self {
            id,
            status: RunStatus::Idle,
            progress_percent: 0,
            config_snapshot,
        }
    }

    /// Record reported progress
    ///
    /// Values are clamped to 100 and never move backwards. Returns whether
    /// the stored percentage changed.
    pub fn advance(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if percent > self.progress_percent {
            self.progress_percent = percent;
            true
        } else {
            false
        }
    }

    /// Whether the run is still in flight
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigType;

    #[test]
    fn progress_never_regresses() {
        let mut run = SimulationRun::new(RunId::new(), TestConfiguration::new(ConfigType::Dns, ""));
        assert!(run.advance(10));
        assert!(!run.advance(7));
        assert_eq!(run.progress_percent, 10);
        assert!(run.advance(250));
        assert_eq!(run.progress_percent, 100);
    }
}
