//! DTS Core - Deployment Test Simulation workflow
//!
//! Coordinates the five workflow stages:
//! - **Configuration**: capture and persist a single test configuration
//! - **Run**: start a sandboxed simulation and follow its progress
//! - **Results**: render the impact analysis of the current result
//! - **Attach**: attach the current result to a change request
//! - **History**: browse and prune past runs
//!
//! The [`WorkflowController`] owns every piece of mutable state (the cached
//! configuration, the current result, the in-flight run, the history ledger
//! and the attachment log). Consumers only ever read from it.
//!
//! # Example
//!
//! ```rust,ignore
//! use dts_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryConfigStore::new());
//! let mut workflow = WorkflowController::open(WorkflowConfig::new(), store).await?;
//!
//! workflow
//!     .save_configuration(TestConfiguration::new(ConfigType::Network, "mtu 9000"))
//!     .await?;
//! workflow.start_run()?;
//! let result = workflow.run_to_completion(|_| {}).await?;
//!
//! let attachment = workflow
//!     .attach(
//!         AttachmentRequest::new_change("test", "sarah.johnson"),
//!         &StaticChangeManagement::default(),
//!     )
//!     .await?;
//! assert_eq!(attachment.result_snapshot().timestamp, result.timestamp);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod attach;
pub mod change;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod notify;
pub mod report;
pub mod stage;
pub mod store;

// Re-exports for convenience
pub use attach::AttachmentRequest;
pub use change::{ChangeManagement, StaticChangeManagement};
pub use config::WorkflowConfig;
pub use controller::{WorkflowController, WorkflowEvent};
pub use error::{
    AttachmentError, ChangeLookupError, ConfigError, HistoryError, StoreError, WorkflowError,
};
pub use history::{sample_records, HistoryLedger, HistoryView};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use report::{ImpactReport, RiskBand};
pub use stage::{Stage, WorkflowState};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the workflow
    pub use crate::{
        AttachmentRequest, ChangeManagement, ConfigStore, FileConfigStore, MemoryConfigStore,
        Stage, StaticChangeManagement, WorkflowConfig, WorkflowController, WorkflowError,
        WorkflowEvent, WorkflowState,
    };
    pub use dts_model::{ConfigType, TestConfiguration, TrafficProfile, Zone};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
