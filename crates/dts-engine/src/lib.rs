//! DTS Engine - Simulation runs and progress reporting
//!
//! Runs one simulation at a time against a configuration snapshot:
//! - Progress ticks on a fixed interval by a random step until 100
//! - A pluggable [`AnalysisStrategy`] turns the snapshot into a result
//! - Every run is cancellable; a dropped [`RunHandle`] stops the tick loop
//!
//! # Example
//!
//! ```rust,ignore
//! use dts_engine::{EngineConfig, EngineEvent, SimulationEngine};
//!
//! let engine = SimulationEngine::new(EngineConfig::default())?;
//! let mut run = engine.start(config)?;
//!
//! while let Some(event) = run.next_event().await {
//!     match event {
//!         EngineEvent::Progress(p) => println!("{p}% {}", dts_engine::phase_label(p)),
//!         EngineEvent::Completed(result) => println!("risk {}", result.risk_score),
//!         EngineEvent::Failed(reason) => eprintln!("{reason}"),
//!     }
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod analysis;
pub mod engine;
pub mod error;
pub mod progress;

// Re-exports for convenience
pub use analysis::{AnalysisStrategy, SyntheticAnalysis};
pub use engine::{EngineConfig, EngineEvent, RunHandle, SimulationEngine};
pub use error::{AnalysisError, EngineError};
pub use progress::{phase_label, Phase};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
