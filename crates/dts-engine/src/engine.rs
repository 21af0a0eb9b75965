//! Simulation engine
//!
//! One run at a time. A run is a spawned tick loop:
//!
//! ```text
//! Progress(0) → tick → Progress(p₁) → tick → … → Progress(100) → analyze → Completed | Failed
//! ```
//!
//! Each tick adds a random step from the configured range and clamps at
//! 100. The loop checks for cancellation at every tick boundary and stops
//! as soon as its [`RunHandle`] is cancelled or dropped.

use crate::analysis::{AnalysisStrategy, SyntheticAnalysis};
use crate::error::{AnalysisError, EngineError};
use dts_model::{FailureReason, RunId, SimulationResult, TestConfiguration};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Events buffered per run before the tick loop waits on the consumer
const EVENT_BUFFER: usize = 128;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between progress ticks
    pub tick_interval_ms: u64,
    /// Smallest progress step per tick
    pub min_step: u8,
    /// Largest progress step per tick
    pub max_step: u8,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With tick interval
    #[inline]
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With step range
    #[inline]
    #[must_use]
    pub fn with_steps(mut self, min_step: u8, max_step: u8) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// With fixed seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Tick interval as a duration
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check that every run can make progress
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.tick_interval_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "tick interval must be positive".to_string(),
            ));
        }
        if self.min_step == 0 {
            return Err(EngineError::InvalidConfig(
                "minimum step must be at least 1".to_string(),
            ));
        }
        if self.min_step > self.max_step {
            return Err(EngineError::InvalidConfig(format!(
                "step range {}..={} is empty",
                self.min_step, self.max_step
            )));
        }
        Ok(())
    }

    fn steps(&self) -> RangeInclusive<u8> {
        self.min_step..=self.max_step
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            min_step: 1,
            max_step: 5,
            seed: None,
        }
    }
}

/// Event emitted by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Percent complete, non-decreasing, ends at 100
    Progress(u8),
    /// Terminal: analysis produced a result
    Completed(SimulationResult),
    /// Terminal: analysis failed
    Failed(FailureReason),
}

impl EngineEvent {
    /// Whether no further events follow
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EngineEvent::Progress(_))
    }
}

/// Single-flight guard shared by the engine, its handles and run tasks
#[derive(Debug, Default)]
struct RunSlot {
    active: Mutex<Option<RunId>>,
}

impl RunSlot {
    fn acquire(&self, run_id: RunId) -> Result<(), EngineError> {
        let mut active = self.active.lock();
        if let Some(current) = *active {
            return Err(EngineError::AlreadyRunning(current));
        }
        *active = Some(run_id);
        Ok(())
    }

    /// Free the slot if `run_id` still holds it
    fn release(&self, run_id: RunId) {
        let mut active = self.active.lock();
        if *active == Some(run_id) {
            *active = None;
        }
    }

    fn active(&self) -> Option<RunId> {
        *self.active.lock()
    }
}

/// Simulation engine
///
/// Cheap to share behind an `Arc`; all runs started from the same engine
/// share one run slot.
pub struct SimulationEngine {
    config: EngineConfig,
    strategy: Arc<dyn AnalysisStrategy>,
    slot: Arc<RunSlot>,
}

impl SimulationEngine {
    /// Create engine with the synthetic analysis
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_strategy(config, Arc::new(SyntheticAnalysis::new()))
    }

    /// Create engine with a custom analysis strategy
    pub fn with_strategy(
        config: EngineConfig,
        strategy: Arc<dyn AnalysisStrategy>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            strategy,
            slot: Arc::new(RunSlot::default()),
        })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run currently holding the slot
    #[inline]
    #[must_use]
    pub fn active_run(&self) -> Option<RunId> {
        self.slot.active()
    }

    /// Whether a run is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active_run().is_some()
    }

    /// Start a run over a configuration snapshot
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - `EngineError::AlreadyRunning` if another run holds the slot; the
    ///   in-flight run is left untouched
    pub fn start(&self, snapshot: TestConfiguration) -> Result<RunHandle, EngineError> {
        let run_id = RunId::new();
        self.slot.acquire(run_id)?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (progress_tx, progress_rx) = watch::channel(0u8);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        tracing::info!(
            %run_id,
            config_type = %snapshot.config_type,
            strategy = self.strategy.name(),
            "simulation started"
        );

        let task = tokio::spawn(drive(RunContext {
            run_id,
            snapshot,
            strategy: Arc::clone(&self.strategy),
            slot: Arc::clone(&self.slot),
            tick: self.config.tick_interval(),
            steps: self.config.steps(),
            rng,
            events: event_tx,
            progress: progress_tx,
            cancel: cancel_rx,
        }));

        Ok(RunHandle {
            run_id,
            events: event_rx,
            progress: progress_rx,
            cancel: cancel_tx,
            slot: Arc::clone(&self.slot),
            task,
        })
    }
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("config", &self.config)
            .field("strategy", &self.strategy.name())
            .field("active_run", &self.slot.active())
            .finish()
    }
}

/// Handle to an in-flight run
///
/// Dropping the handle cancels the run: the tick loop stops, no further
/// events are produced, and the run slot is freed.
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    events: mpsc::Receiver<EngineEvent>,
    progress: watch::Receiver<u8>,
    cancel: watch::Sender<bool>,
    slot: Arc<RunSlot>,
    task: JoinHandle<()>,
}

impl RunHandle {
    /// Run identifier
    #[inline]
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Next event, or `None` once the run has ended
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.recv().await
    }

    /// Latest reported percentage
    #[inline]
    #[must_use]
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    /// Observable progress stream, independent of the event queue
    #[must_use]
    pub fn watch_progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    /// Whether the tick loop has exited
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the run
    pub fn cancel(self) {
        tracing::info!(run_id = %self.run_id, "simulation cancel requested");
        drop(self);
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        let _ = self.cancel.send(true);
        self.task.abort();
        self.slot.release(self.run_id);
    }
}

struct RunContext {
    run_id: RunId,
    snapshot: TestConfiguration,
    strategy: Arc<dyn AnalysisStrategy>,
    slot: Arc<RunSlot>,
    tick: Duration,
    steps: RangeInclusive<u8>,
    rng: StdRng,
    events: mpsc::Sender<EngineEvent>,
    progress: watch::Sender<u8>,
    cancel: watch::Receiver<bool>,
}

impl RunContext {
    /// Deliver an event; `false` once the consumer is gone
    async fn emit(&self, event: EngineEvent) -> bool {
        self.events.send(event).await.is_ok()
    }
}

async fn drive(mut ctx: RunContext) {
    let mut ticker = time::interval(ctx.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    let mut percent = 0u8;
    if !ctx.emit(EngineEvent::Progress(percent)).await {
        return;
    }

    while percent < 100 {
        tokio::select! {
            biased;
            _ = ctx.cancel.changed() => {
                tracing::debug!(run_id = %ctx.run_id, percent, "tick loop cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let step = ctx.rng.random_range(ctx.steps.clone());
        percent = percent.saturating_add(step).min(100);
        ctx.progress.send_replace(percent);
        tracing::trace!(run_id = %ctx.run_id, percent, "progress");

        if !ctx.emit(EngineEvent::Progress(percent)).await {
            return;
        }
    }

    let outcome = tokio::select! {
        biased;
        _ = ctx.cancel.changed() => {
            tracing::debug!(run_id = %ctx.run_id, "analysis cancelled");
            return;
        }
        outcome = ctx.strategy.analyze(&ctx.snapshot) => outcome,
    };

    let event = match outcome.and_then(checked) {
        Ok(result) => {
            tracing::info!(
                run_id = %ctx.run_id,
                risk_score = result.risk_score,
                critical_issues = result.critical_issues,
                "simulation completed"
            );
            EngineEvent::Completed(result)
        }
        Err(err) => {
            tracing::warn!(run_id = %ctx.run_id, error = %err, "simulation failed");
            EngineEvent::Failed(FailureReason::analysis(err.to_string()))
        }
    };

    // Free the slot before the terminal event so a consumer reacting to it
    // can start the next run immediately.
    ctx.slot.release(ctx.run_id);
    let _ = ctx.emit(event).await;
}

fn checked(result: SimulationResult) -> Result<SimulationResult, AnalysisError> {
    result
        .validate()
        .map_err(|e| AnalysisError::InvalidResult(e.to_string()))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dts_model::ConfigType;

    fn fast_config() -> EngineConfig {
        EngineConfig::new()
            .with_tick_interval(Duration::from_millis(10))
            .with_seed(7)
    }

    #[test]
    fn config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::new().with_steps(0, 5).validate().is_err());
        assert!(EngineConfig::new().with_steps(6, 5).validate().is_err());
        assert!(EngineConfig::new()
            .with_tick_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn invalid_config_rejected_by_engine() {
        let err = SimulationEngine::new(EngineConfig::new().with_steps(3, 1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn run_slot_release_is_scoped() {
        let slot = RunSlot::default();
        let first = RunId::new();
        let second = RunId::new();

        slot.acquire(first).unwrap();
        assert!(slot.acquire(second).is_err());

        // A stale release must not free someone else's run
        slot.release(second);
        assert_eq!(slot.active(), Some(first));

        slot.release(first);
        assert!(slot.acquire(second).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_completes_with_result() {
        let engine = SimulationEngine::new(fast_config()).unwrap();
        let mut run = engine
            .start(TestConfiguration::new(ConfigType::Network, "x"))
            .unwrap();

        let mut last = None;
        while let Some(event) = run.next_event().await {
            last = Some(event);
        }

        assert!(matches!(last, Some(EngineEvent::Completed(_))));
        assert_eq!(run.progress(), 100);
        assert!(!engine.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_frees_slot() {
        let engine = SimulationEngine::new(fast_config()).unwrap();
        let run = engine
            .start(TestConfiguration::new(ConfigType::Dns, ""))
            .unwrap();
        assert!(engine.is_busy());

        drop(run);
        assert!(!engine.is_busy());
        assert!(engine.start(TestConfiguration::new(ConfigType::Dns, "")).is_ok());
    }
}
