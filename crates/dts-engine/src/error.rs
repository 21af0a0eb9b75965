//! Error types for the simulation engine

use dts_model::RunId;

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Another run holds the single run slot
    #[error("simulation {0} is already running")]
    AlreadyRunning(RunId),

    /// Engine configuration is unusable
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Analysis strategy errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    /// The configuration cannot be analysed
    #[error("configuration rejected: {0}")]
    Rejected(String),

    /// Backing analyser could not be reached
    #[error("analyser unavailable: {0}")]
    Unavailable(String),

    /// Analyser produced a result outside the allowed ranges
    #[error("invalid result: {0}")]
    InvalidResult(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_display() {
        let id = RunId::new();
        let err = EngineError::AlreadyRunning(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn analysis_error_display() {
        let err = AnalysisError::Unavailable("timeout".to_string());
        assert_eq!(err.to_string(), "analyser unavailable: timeout");
    }
}
