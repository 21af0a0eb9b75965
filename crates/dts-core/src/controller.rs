//! Workflow controller
//!
//! The single owner of session state. Every mutation of the configuration
//! cache, the current result, the in-flight run, the history ledger and the
//! attachment log goes through [`WorkflowController`]; consumers get shared
//! references only.
//!
//! # Run lifecycle
//! 1. `start_run` snapshots the saved configuration and starts the engine
//! 2. `next_event` pumps one engine event and applies it to the state
//! 3. A completed run replaces the current result and moves to Results
//! 4. A failed run keeps the configuration and stays on the current stage
//! 5. `cancel_run` stops the tick loop and restores the pre-start state

use crate::attach::{self, AttachmentRequest};
use crate::change::ChangeManagement;
use crate::config::WorkflowConfig;
use crate::error::{AttachmentError, WorkflowError};
use crate::history::{self, HistoryLedger, HistoryView};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::report::ImpactReport;
use crate::stage::{self, Stage, WorkflowState};
use crate::store::ConfigStore;
use dts_engine::{
    phase_label, AnalysisStrategy, EngineEvent, Phase, RunHandle, SimulationEngine,
    SyntheticAnalysis,
};
use dts_model::{
    ChangeRequestAttachment, FailureReason, HistoryRecord, RecordId, RunId, RunStatus,
    SimulationResult, SimulationRun, TestConfiguration,
};
use std::sync::Arc;

/// Something the controller observed while pumping a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Progress moved forward
    Progress {
        run_id: RunId,
        percent: u8,
        phase: Phase,
    },
    /// Run finished and its result is now current
    Completed {
        run_id: RunId,
        result: SimulationResult,
    },
    /// Run reached the failed terminal state
    Failed {
        run_id: RunId,
        reason: FailureReason,
    },
}

impl WorkflowEvent {
    /// Run the event belongs to
    #[inline]
    #[must_use]
    pub fn run_id(&self) -> RunId {
        match self {
            WorkflowEvent::Progress { run_id, .. }
            | WorkflowEvent::Completed { run_id, .. }
            | WorkflowEvent::Failed { run_id, .. } => *run_id,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowEvent::Progress { .. })
    }
}

/// In-flight run and the state to return to if it is cancelled
struct ActiveRun {
    handle: RunHandle,
    run: SimulationRun,
    resume: WorkflowState,
}

/// Coordinates the configuration, run, results, attach and history stages
pub struct WorkflowController {
    config: WorkflowConfig,
    store: Arc<dyn ConfigStore>,
    engine: SimulationEngine,
    notifier: Arc<dyn Notifier>,
    configuration: Option<TestConfiguration>,
    state: WorkflowState,
    active_stage: Stage,
    current_result: Option<SimulationResult>,
    active: Option<ActiveRun>,
    last_run: Option<SimulationRun>,
    history: HistoryLedger,
    attachments: Vec<ChangeRequestAttachment>,
}

impl WorkflowController {
    /// Open a session with the synthetic analysis
    ///
    /// Loads the persisted configuration; a missing or malformed slot opens
    /// the session in `NoConfig`.
    ///
    /// # Errors
    /// - `WorkflowError::Config` if the workflow configuration is invalid
    pub async fn open(
        config: WorkflowConfig,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self, WorkflowError> {
        Self::open_with_strategy(config, store, Arc::new(SyntheticAnalysis::new())).await
    }

    /// Open a session with a custom analysis strategy
    ///
    /// # Errors
    /// - `WorkflowError::Config` if the workflow configuration is invalid
    pub async fn open_with_strategy(
        config: WorkflowConfig,
        store: Arc<dyn ConfigStore>,
        strategy: Arc<dyn AnalysisStrategy>,
    ) -> Result<Self, WorkflowError> {
        config.validate()?;
        let engine = SimulationEngine::with_strategy(config.engine.clone(), strategy)?;
        let configuration = store.load().await;
        let state = if configuration.is_some() {
            WorkflowState::ConfigReady
        } else {
            WorkflowState::NoConfig
        };

        tracing::info!(state = state.name(), "workflow opened");

        Ok(Self {
            config,
            store,
            engine,
            notifier: Arc::new(TracingNotifier),
            configuration,
            state,
            active_stage: Stage::Configuration,
            current_result: None,
            active: None,
            last_run: None,
            history: HistoryLedger::new(),
            attachments: Vec::new(),
        })
    }

    /// Replace the notification sink
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Seed the history ledger
    #[must_use]
    pub fn with_history(mut self, history: HistoryLedger) -> Self {
        self.history = history;
        self
    }

    /// Workflow configuration
    #[inline]
    #[must_use]
    pub fn workflow_config(&self) -> &WorkflowConfig {
        &self.config
    }

    // ---- configuration stage ----

    /// Persist a configuration, overwriting the previous one
    ///
    /// A run in flight keeps the snapshot it started with.
    ///
    /// # Errors
    /// - `WorkflowError::Store` if the slot could not be written; the cached
    ///   configuration is left unchanged
    pub async fn save_configuration(
        &mut self,
        configuration: TestConfiguration,
    ) -> Result<(), WorkflowError> {
        if let Err(e) = self.store.save(&configuration).await {
            tracing::warn!(error = %e, "configuration save failed");
            self.notify(Notification::error(format!("Could not save configuration: {e}")));
            return Err(e.into());
        }

        tracing::info!(config_type = %configuration.config_type, "configuration saved");
        self.configuration = Some(configuration);
        if self.state == WorkflowState::NoConfig {
            self.transition(WorkflowState::ConfigReady);
        }
        self.notify(Notification::success("Configuration saved"));
        Ok(())
    }

    /// Re-read the persisted configuration
    ///
    /// Degrades to no configuration when the slot is empty or unreadable.
    pub async fn reload_configuration(&mut self) -> Option<&TestConfiguration> {
        self.configuration = self.store.load().await;
        let loaded = self.configuration.is_some();
        if loaded && self.state == WorkflowState::NoConfig {
            self.transition(WorkflowState::ConfigReady);
        } else if !loaded && self.state == WorkflowState::ConfigReady {
            self.transition(WorkflowState::NoConfig);
        }
        self.configuration.as_ref()
    }

    /// Cached configuration
    #[inline]
    #[must_use]
    pub fn configuration(&self) -> Option<&TestConfiguration> {
        self.configuration.as_ref()
    }

    // ---- run stage ----

    #[inline]
    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Whether the start action is enabled
    #[inline]
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.configuration.is_some() && self.active.is_none() && stage::can_start(&self.state)
    }

    /// Start a run over the saved configuration
    ///
    /// # Errors
    /// - `WorkflowError::AlreadyRunning` if a run is in flight; that run is
    ///   not touched
    /// - `WorkflowError::MissingConfiguration` if nothing is saved
    /// - `WorkflowError::Engine` if the engine refuses the run
    pub fn start_run(&mut self) -> Result<RunId, WorkflowError> {
        if self.active.is_some() {
            tracing::warn!("start requested while a run is in flight");
            return Err(WorkflowError::AlreadyRunning);
        }
        let Some(snapshot) = self.configuration.clone() else {
            self.notify(Notification::error(
                "Save a configuration before starting a simulation",
            ));
            return Err(WorkflowError::MissingConfiguration);
        };

        let handle = self.engine.start(snapshot.clone())?;
        let run_id = handle.run_id();
        let mut run = SimulationRun::new(run_id, snapshot);
        run.status = RunStatus::Running;

        let resume = std::mem::replace(&mut self.state, WorkflowState::Running);
        tracing::info!(%run_id, from = resume.name(), "workflow state -> running");
        self.active = Some(ActiveRun {
            handle,
            run,
            resume,
        });
        self.notify(Notification::info("Simulation started"));
        Ok(run_id)
    }

    /// Pump one event from the in-flight run
    ///
    /// Terminal events are applied before they are returned: the result is
    /// current (or the failure recorded) by the time the caller sees them.
    ///
    /// # Errors
    /// - `WorkflowError::NotRunning` if no run is in flight
    pub async fn next_event(&mut self) -> Result<WorkflowEvent, WorkflowError> {
        let active = self.active.as_mut().ok_or(WorkflowError::NotRunning)?;
        let run_id = active.handle.run_id();

        let event = active.handle.next_event().await;
        match event {
            Some(EngineEvent::Progress(percent)) => {
                active.run.advance(percent);
                let percent = active.run.progress_percent;
                tracing::debug!(%run_id, percent, "progress");
                Ok(WorkflowEvent::Progress {
                    run_id,
                    percent,
                    phase: Phase::from_percent(percent),
                })
            }
            Some(EngineEvent::Completed(result)) => {
                self.complete(result.clone());
                Ok(WorkflowEvent::Completed { run_id, result })
            }
            Some(EngineEvent::Failed(reason)) => {
                self.fail(reason.clone());
                Ok(WorkflowEvent::Failed { run_id, reason })
            }
            None => {
                let reason = FailureReason::engine("run ended without a result");
                self.fail(reason.clone());
                Ok(WorkflowEvent::Failed { run_id, reason })
            }
        }
    }

    /// Pump events until the in-flight run ends
    ///
    /// # Errors
    /// - `WorkflowError::NotRunning` if no run is in flight
    /// - `WorkflowError::RunFailed` if the run reached the failed state
    pub async fn run_to_completion<F>(
        &mut self,
        mut on_event: F,
    ) -> Result<SimulationResult, WorkflowError>
    where
        F: FnMut(&WorkflowEvent),
    {
        loop {
            let event = self.next_event().await?;
            on_event(&event);
            match event {
                WorkflowEvent::Progress { .. } => {}
                WorkflowEvent::Completed { result, .. } => return Ok(result),
                WorkflowEvent::Failed { reason, .. } => {
                    return Err(WorkflowError::RunFailed(reason))
                }
            }
        }
    }

    /// Discard the in-flight run
    ///
    /// No further progress is produced and the state held before start is
    /// restored, including any prior result. If the configuration was
    /// reloaded away meanwhile, `ConfigReady` falls back to `NoConfig`.
    ///
    /// # Errors
    /// - `WorkflowError::NotRunning` if no run is in flight
    pub fn cancel_run(&mut self) -> Result<RunId, WorkflowError> {
        let ActiveRun {
            handle,
            mut run,
            resume,
        } = self.active.take().ok_or(WorkflowError::NotRunning)?;
        let run_id = handle.run_id();
        handle.cancel();

        run.status = RunStatus::Idle;
        self.last_run = Some(run);
        // A reload during the run may have emptied the slot.
        let resume = match resume {
            WorkflowState::ConfigReady if self.configuration.is_none() => WorkflowState::NoConfig,
            other => other,
        };
        self.transition(resume);
        self.notify(Notification::info("Simulation cancelled"));
        Ok(run_id)
    }

    /// Progress of the in-flight run, or of the last finished run
    #[must_use]
    pub fn progress(&self) -> Option<u8> {
        self.current_run().map(|run| run.progress_percent)
    }

    /// Phase label for the current progress
    #[must_use]
    pub fn phase_label(&self) -> Option<&'static str> {
        self.progress().map(phase_label)
    }

    /// In-flight run, or the last one that ended
    #[must_use]
    pub fn current_run(&self) -> Option<&SimulationRun> {
        self.active
            .as_ref()
            .map(|active| &active.run)
            .or(self.last_run.as_ref())
    }

    // ---- results stage ----

    /// Result of the most recent completed run
    ///
    /// Stays visible while a re-run is in flight and is replaced only when
    /// that run completes.
    #[inline]
    #[must_use]
    pub fn current_result(&self) -> Option<&SimulationResult> {
        self.current_result.as_ref()
    }

    #[must_use]
    pub fn impact_report(&self) -> Option<ImpactReport> {
        ImpactReport::from_result(self.current_result.as_ref())
    }

    // ---- navigation ----

    #[inline]
    #[must_use]
    pub fn active_stage(&self) -> Stage {
        self.active_stage
    }

    /// Show a stage
    ///
    /// # Errors
    /// - `WorkflowError::StageUnreachable` if the state gates the stage; the
    ///   active stage is unchanged
    pub fn select_stage(&mut self, stage: Stage) -> Result<(), WorkflowError> {
        if !stage::is_reachable(stage, &self.state) {
            return Err(WorkflowError::StageUnreachable {
                stage,
                state: self.state.name(),
            });
        }
        self.active_stage = stage;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_reachable(&self, stage: Stage) -> bool {
        stage::is_reachable(stage, &self.state)
    }

    #[must_use]
    pub fn reachable_stages(&self) -> Vec<Stage> {
        stage::reachable_stages(&self.state)
    }

    // ---- attach stage ----

    /// Attach the current result to a change request
    ///
    /// The pending-change list is only queried for existing-change requests.
    /// A rejected submission leaves the attachment log untouched.
    ///
    /// # Errors
    /// - `WorkflowError::StageUnreachable` unless the latest run completed
    /// - `WorkflowError::Attachment` naming the first failed validation rule
    pub async fn attach(
        &mut self,
        request: AttachmentRequest,
        changes: &dyn ChangeManagement,
    ) -> Result<&ChangeRequestAttachment, WorkflowError> {
        if !stage::is_reachable(Stage::Attach, &self.state) {
            return Err(WorkflowError::StageUnreachable {
                stage: Stage::Attach,
                state: self.state.name(),
            });
        }
        let Some(result) = self.current_result.clone() else {
            return Err(AttachmentError::NoResult.into());
        };

        let target = match self.validate_attachment(&request, changes).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(error = %e, "attachment rejected");
                self.notify(Notification::error(e.to_string()));
                return Err(e.into());
            }
        };

        let attachment = ChangeRequestAttachment::new(
            target,
            request.summary.trim(),
            request.approver.trim(),
            result,
        );
        tracing::info!(
            attachment_id = %attachment.id(),
            change_type = %attachment.change_type(),
            "result attached to change request"
        );
        self.notify(Notification::success("Simulation results attached"));

        let index = self.attachments.len();
        self.attachments.push(attachment);
        Ok(&self.attachments[index])
    }

    async fn validate_attachment(
        &self,
        request: &AttachmentRequest,
        changes: &dyn ChangeManagement,
    ) -> Result<dts_model::ChangeTarget, AttachmentError> {
        let pending = if request.needs_pending_changes() {
            changes.pending_changes().await?
        } else {
            Vec::new()
        };
        attach::validate(request, &self.config.approvers, &pending)
    }

    /// Attachments created this session, oldest first
    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[ChangeRequestAttachment] {
        &self.attachments
    }

    // ---- history stage ----

    #[inline]
    #[must_use]
    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Delete one history record
    ///
    /// # Errors
    /// - `WorkflowError::History` if no record has this id
    pub fn delete_history_record(&mut self, id: RecordId) -> Result<HistoryRecord, WorkflowError> {
        let record = self.history.delete(id)?;
        tracing::info!(record_id = %id, "history record deleted");
        self.notify(Notification::success("History record deleted"));
        Ok(record)
    }

    /// Display a history record as a result
    ///
    /// # Errors
    /// - `WorkflowError::History` if no record has this id
    pub fn view_history_record(&self, id: RecordId) -> Result<HistoryView, WorkflowError> {
        Ok(self.history.view(id)?)
    }

    // ---- internals ----

    fn complete(&mut self, result: SimulationResult) {
        let Some(ActiveRun { mut run, .. }) = self.active.take() else {
            return;
        };
        run.advance(100);
        run.status = RunStatus::Completed;

        if self.config.record_history {
            self.history.append(history::record_for_run(
                &run.config_snapshot,
                &result,
                &self.config.operator,
            ));
        }

        tracing::info!(run_id = %run.id, risk_score = result.risk_score, "simulation completed");
        self.last_run = Some(run);
        self.current_result = Some(result);
        self.transition(WorkflowState::Completed);
        self.active_stage = Stage::Results;
        self.notify(Notification::success("Simulation completed"));
    }

    fn fail(&mut self, reason: FailureReason) {
        let Some(ActiveRun { mut run, .. }) = self.active.take() else {
            return;
        };
        run.status = RunStatus::Failed;

        if self.config.record_history {
            self.history.append(history::record_for_failure(
                &run.config_snapshot,
                &reason,
                &self.config.operator,
            ));
        }

        tracing::warn!(run_id = %run.id, %reason, "simulation failed");
        self.last_run = Some(run);
        // The latest run did not complete, so nothing is current.
        self.current_result = None;
        self.notify(Notification::error(format!("Simulation failed: {reason}")));
        self.transition(WorkflowState::Failed(reason));
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::info!(from = self.state.name(), to = next.name(), "workflow state");
        self.state = next;
        if !stage::is_reachable(self.active_stage, &self.state) {
            self.active_stage = Stage::Run;
        }
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("state", &self.state)
            .field("active_stage", &self.active_stage)
            .field("has_configuration", &self.configuration.is_some())
            .field("has_result", &self.current_result.is_some())
            .field("active_run", &self.active.as_ref().map(|a| a.run.id))
            .field("history_len", &self.history.len())
            .field("attachments", &self.attachments.len())
            .finish_non_exhaustive()
    }
}
