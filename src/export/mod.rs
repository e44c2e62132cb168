//! Read-only derived views over the stored scan sequence.
//!
//! Pure format conversion: nothing here mutates the session.

pub mod chart;
pub mod csv;

use thiserror::Error;

/// Export failures, surfaced to the caller as a rejection.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data available")]
    EmptyDataset,

    #[error("chart encoding failed: {0}")]
    Encode(String),
}
