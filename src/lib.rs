//! Synheart Cognilock - Session-based behavioral stress scoring engine
//!
//! Cognilock advances a synthetic activity session tick by tick and turns it into
//! a stress score and cognitive signals through a deterministic pipeline:
//! behavior simulation → stress classification → temporal smoothing → cognitive
//! analysis.
//!
//! ## Modules
//!
//! - **Session**: lifecycle and per-tick orchestration ([`SessionController`])
//! - **Scoring**: simulator, classifier, smoother and analyzer stages
//! - **Server**: JSON HTTP routes over a shared controller (feature `server`)

pub mod analyzer;
pub mod archive;
pub mod classifier;
pub mod config;
pub mod error;
pub mod puzzle;
pub mod session;
pub mod simulator;
pub mod smoother;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use classifier::{RandomForest, StressClassifier};
pub use config::EngineConfig;
pub use error::EngineError;
pub use session::SessionController;
pub use types::{Mode, SessionSummary, StartAck, TickReport};

/// Cognilock version reported by the CLI and health endpoint
pub const COGNILOCK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported in diagnostics
pub const PRODUCER_NAME: &str = "synheart-cognilock";
