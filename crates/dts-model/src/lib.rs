//! DTS Data Model
//!
//! Typed records shared by every stage of a deployment test simulation.
//!
//! # Core Concepts
//!
//! - [`TestConfiguration`]: the single persisted configuration slot
//! - [`SimulationRun`]: one execution attempt over a configuration snapshot
//! - [`SimulationResult`]: the result object handed to every consumer
//! - [`ChangeRequestAttachment`]: a result attached to a change request
//! - [`HistoryRecord`]: one entry of the append-only run ledger
//!
//! All records serialise to the camelCase JSON shapes used at the
//! persistence and consumer boundaries.
//!
//! # Example
//!
//! ```rust
//! use dts_model::{ConfigType, TestConfiguration, TrafficProfile, Zone};
//!
//! let config = TestConfiguration::new(ConfigType::Network, "interface eth0")
//!     .with_zone(Zone::Global)
//!     .with_traffic(TrafficProfile::Normal);
//!
//! let json = config.to_json().unwrap();
//! assert!(json.contains("\"configType\":\"network\""));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

#[macro_use]
mod wire;

mod attachment;
mod change;
mod config;
mod error;
mod history;
mod ids;
mod result;
mod run;

// Re-exports
pub use attachment::{ChangeRequestAttachment, ChangeTarget, ChangeType};
pub use change::PendingChange;
pub use config::{ConfigType, TestConfiguration, TrafficProfile, Zone};
pub use error::ModelError;
pub use history::{HistoryRecord, HistoryStatus};
pub use ids::{AttachmentId, RecordId, RunId};
pub use result::{AffectedService, ConfigDiff, FailureKind, FailureReason, Impact, SimulationResult};
pub use run::{RunStatus, SimulationRun};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
