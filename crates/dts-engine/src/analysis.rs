//! Analysis strategies
//!
//! The engine drives progress; the strategy produces the result once
//! progress reaches 100. Swapping in a real analyser only means another
//! [`AnalysisStrategy`] implementation.

use crate::error::AnalysisError;
use dts_model::{AffectedService, ConfigDiff, Impact, SimulationResult, TestConfiguration};
use std::time::Duration;

/// Turns a configuration snapshot into a simulation result
#[async_trait::async_trait]
pub trait AnalysisStrategy: Send + Sync {
    /// Analyse a configuration snapshot
    async fn analyze(&self, config: &TestConfiguration) -> Result<SimulationResult, AnalysisError>;

    /// Short name for logs
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Fixed-shape stand-in analysis
///
/// Produces the same risk, diff and service list for every configuration,
/// stamped with the completion instant.
#[derive(Debug, Clone, Default)]
pub struct SyntheticAnalysis {
    delay: Option<Duration>,
}

impl SyntheticAnalysis {
    /// Create synthetic analysis
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait before producing the result
    #[inline]
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The fixed result body
    #[must_use]
    pub fn reference_result() -> SimulationResult {
        SimulationResult::new(87, ConfigDiff::new(12, 3, 8))
            .with_services(vec![
                AffectedService::new("API Gateway", Impact::None),
                AffectedService::new("Authentication Service", Impact::Minor),
                AffectedService::new("Database Cluster", Impact::None),
                AffectedService::new("Load Balancer", Impact::Minor),
                AffectedService::new("CDN", Impact::None),
            ])
            .with_issues(0, 3)
    }
}

#[async_trait::async_trait]
impl AnalysisStrategy for SyntheticAnalysis {
    async fn analyze(&self, config: &TestConfiguration) -> Result<SimulationResult, AnalysisError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        tracing::debug!(
            config_type = %config.config_type,
            zone = %config.selected_zone,
            "synthetic analysis"
        );
        Ok(Self::reference_result())
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dts_model::ConfigType;

    #[tokio::test]
    async fn synthetic_result_is_fixed_shape() {
        let strategy = SyntheticAnalysis::new();
        let a = strategy
            .analyze(&TestConfiguration::new(ConfigType::Network, "a"))
            .await
            .unwrap();
        let b = strategy
            .analyze(&TestConfiguration::new(ConfigType::Custom, "completely different"))
            .await
            .unwrap();

        assert_eq!(a.risk_score, b.risk_score);
        assert_eq!(a.config_diff, b.config_diff);
        assert_eq!(a.affected_services, b.affected_services);
        assert_eq!(a.affected_services.len(), 5);
        assert!(a.validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn synthetic_delay_is_honoured() {
        let strategy = SyntheticAnalysis::new().with_delay(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        strategy
            .analyze(&TestConfiguration::new(ConfigType::Dns, ""))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
