//! Tactus: tactile materials-classification test orchestration.
//!
//! Drives a timed classification test fed by an external multi-channel
//! resistance/capacitance sensor. The device streams scans at the ingestion
//! endpoint while an operator page polls for status once a second; each poll
//! advances one tick of test time through alternating Touch/Untouch phases,
//! and when the configured cycles elapse the running average of every
//! reading is classified into a binary verdict (Soft/Hard or Fresh/Rotten).
//!
//! ## Architecture
//!
//! - **session**: the core - lifecycle state machine, phase clock, sample
//!   aggregation, classifier, status reporting
//! - **api**: axum transport, one shared session behind a lock
//! - **export**: read-only CSV and PNG chart views over the scan sequence
//! - **config**: TOML deployment configuration with env-var override

pub mod api;
pub mod config;
pub mod export;
pub mod session;
pub mod types;

pub use config::TactusConfig;
pub use session::{SessionConfig, StatusSnapshot, TestPhase, TestSession};
pub use types::{ClassificationKind, Scan, Verdict};
