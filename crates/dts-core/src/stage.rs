//! Workflow states and stage gating
//!
//! ```text
//! NoConfig --save--> ConfigReady --start--> Running --complete--> Completed
//!                                              |  \--fail-------> Failed
//!                                              \----cancel-----> (state before start)
//! Completed | Failed --start--> Running
//! ```
//!
//! Stage reachability is a pure function of the state.

use dts_model::FailureReason;

/// One of the five workflow views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Configuration,
    Run,
    Results,
    Attach,
    History,
}

impl Stage {
    /// Every stage in display order
    pub const ALL: [Stage; 5] = [
        Stage::Configuration,
        Stage::Run,
        Stage::Results,
        Stage::Attach,
        Stage::History,
    ];

    /// Lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Configuration => "configuration",
            Stage::Run => "run",
            Stage::Results => "results",
            Stage::Attach => "attach",
            Stage::History => "history",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state for one session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Nothing saved yet
    #[default]
    NoConfig,
    /// A configuration is saved, no result yet
    ConfigReady,
    /// A run is in flight
    Running,
    /// The latest run produced the current result
    Completed,
    /// The latest run failed; the configuration is kept for a retry
    Failed(FailureReason),
}

impl WorkflowState {
    /// Short name for logs and messages
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            WorkflowState::NoConfig => "no configuration",
            WorkflowState::ConfigReady => "configuration ready",
            WorkflowState::Running => "running",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed(_) => "failed",
        }
    }

    /// Whether a run is in flight
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, WorkflowState::Running)
    }

    /// Whether the state implies a saved configuration
    #[inline]
    #[must_use]
    pub fn has_configuration(&self) -> bool {
        !matches!(self, WorkflowState::NoConfig)
    }
}

/// Whether `stage` can be shown in `state`
#[must_use]
pub fn is_reachable(stage: Stage, state: &WorkflowState) -> bool {
    match stage {
        Stage::Configuration | Stage::Run | Stage::History => true,
        Stage::Results => matches!(state, WorkflowState::Running | WorkflowState::Completed),
        Stage::Attach => matches!(state, WorkflowState::Completed),
    }
}

/// Whether the start action is enabled in `state`
#[must_use]
pub fn can_start(state: &WorkflowState) -> bool {
    matches!(
        state,
        WorkflowState::ConfigReady | WorkflowState::Completed | WorkflowState::Failed(_)
    )
}

/// Stages reachable in `state`, in display order
#[must_use]
pub fn reachable_stages(state: &WorkflowState) -> Vec<Stage> {
    Stage::ALL
        .into_iter()
        .filter(|stage| is_reachable(*stage, state))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<WorkflowState> {
        vec![
            WorkflowState::NoConfig,
            WorkflowState::ConfigReady,
            WorkflowState::Running,
            WorkflowState::Completed,
            WorkflowState::Failed(FailureReason::analysis("x")),
        ]
    }

    #[test]
    fn always_reachable_stages() {
        for state in all_states() {
            assert!(is_reachable(Stage::Configuration, &state));
            assert!(is_reachable(Stage::Run, &state));
            assert!(is_reachable(Stage::History, &state));
        }
    }

    #[test]
    fn results_gating() {
        for state in all_states() {
            let expected = matches!(state, WorkflowState::Running | WorkflowState::Completed);
            assert_eq!(is_reachable(Stage::Results, &state), expected, "{state:?}");
        }
    }

    #[test]
    fn attach_gating() {
        for state in all_states() {
            let expected = state == WorkflowState::Completed;
            assert_eq!(is_reachable(Stage::Attach, &state), expected, "{state:?}");
        }
    }

    #[test]
    fn start_gating() {
        assert!(!can_start(&WorkflowState::NoConfig));
        assert!(can_start(&WorkflowState::ConfigReady));
        assert!(!can_start(&WorkflowState::Running));
        assert!(can_start(&WorkflowState::Completed));
        assert!(can_start(&WorkflowState::Failed(FailureReason::engine("x"))));
    }

    #[test]
    fn reachable_in_no_config() {
        assert_eq!(
            reachable_stages(&WorkflowState::NoConfig),
            vec![Stage::Configuration, Stage::Run, Stage::History]
        );
    }
}
