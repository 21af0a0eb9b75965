//! Testing utilities for the DTS workspace
//!
//! Shared fixtures, fake collaborators and session setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use dts_core::{
    MemoryConfigStore, Notification, NotificationLevel, Notifier, WorkflowConfig,
    WorkflowController,
};
use dts_engine::{AnalysisError, AnalysisStrategy, EngineConfig};
use dts_model::{ConfigType, SimulationResult, TestConfiguration, TrafficProfile, Zone};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Tick interval used by test sessions
pub const TEST_TICK: Duration = Duration::from_millis(10);

/// Fixed seed so progress sequences repeat
pub const TEST_SEED: u64 = 42;

/// The configuration from the end-to-end scenario
pub fn network_config() -> TestConfiguration {
    TestConfiguration::new(ConfigType::Network, "interface eth0\n  mtu 9000\n")
        .with_zone(Zone::Global)
        .with_replication(false)
        .with_traffic(TrafficProfile::Normal)
}

pub fn test_engine_config() -> EngineConfig {
    EngineConfig::new()
        .with_tick_interval(TEST_TICK)
        .with_seed(TEST_SEED)
}

pub fn test_workflow_config() -> WorkflowConfig {
    WorkflowConfig::new()
        .with_operator("test.user")
        .with_record_history(true)
        .with_engine(test_engine_config())
}

/// Notifier that keeps everything it is sent
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.sent.lock().iter().filter(|n| n.level == level).count()
    }

    pub fn last(&self) -> Option<Notification> {
        self.sent.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().push(notification);
    }
}

/// Analysis that always refuses
#[derive(Debug, Clone)]
pub struct FailingAnalysis {
    pub message: String,
}

impl FailingAnalysis {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl AnalysisStrategy for FailingAnalysis {
    async fn analyze(
        &self,
        _config: &TestConfiguration,
    ) -> Result<SimulationResult, AnalysisError> {
        Err(AnalysisError::Unavailable(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Analysis that returns a fixed result
#[derive(Debug, Clone)]
pub struct FixedAnalysis(pub SimulationResult);

#[async_trait]
impl AnalysisStrategy for FixedAnalysis {
    async fn analyze(
        &self,
        _config: &TestConfiguration,
    ) -> Result<SimulationResult, AnalysisError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Fresh session over an empty in-memory store
pub async fn setup_test_workflow() -> (WorkflowController, Arc<RecordingNotifier>) {
    setup_test_workflow_with(Arc::new(dts_engine::SyntheticAnalysis::new())).await
}

/// Fresh session with a custom analysis strategy
pub async fn setup_test_workflow_with(
    strategy: Arc<dyn AnalysisStrategy>,
) -> (WorkflowController, Arc<RecordingNotifier>) {
    let notifier = RecordingNotifier::new();
    let workflow = WorkflowController::open_with_strategy(
        test_workflow_config(),
        Arc::new(MemoryConfigStore::new()),
        strategy,
    )
    .await
    .expect("test workflow config is valid")
    .with_notifier(notifier.clone());
    (workflow, notifier)
}
