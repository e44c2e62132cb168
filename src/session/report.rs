//! Externally visible status snapshot, assembled on each poll.
//!
//! Polling is what advances test time: one poll while running equals one
//! tick. Callers are expected to poll at a stable cadence of roughly one
//! second; the engine assumes, and never verifies, that correspondence.

use serde::Serialize;

use crate::session::clock;
use crate::session::state::{FinishReason, Lifecycle, TestSession};
use crate::types::Verdict;

/// Snapshot returned to pollers. Field names are the device-frontend wire
/// contract and must not change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub elapsed_time: u64,
    pub average: f64,
    pub finished: bool,
    pub result: String,
}

/// Advance the session by one tick (when running) and report its state.
pub fn poll(session: &mut TestSession) -> StatusSnapshot {
    session.advance();
    snapshot(session)
}

/// Pure read of the current session state.
pub fn snapshot(session: &TestSession) -> StatusSnapshot {
    let status = match session.lifecycle() {
        Lifecycle::Idle => "Waiting...".to_string(),
        Lifecycle::Running => {
            let phase = clock::phase_at(
                session.elapsed_ticks(),
                session.config().phase_duration_secs,
            );
            format!(
                "{} Phase | Running {} Test...",
                phase.name(),
                session.config().kind.display_name()
            )
        }
        Lifecycle::Finished(FinishReason::Completed) => "Test Completed".to_string(),
        Lifecycle::Finished(FinishReason::Stopped) => "Stopped by user".to_string(),
        Lifecycle::Finished(FinishReason::NoData) => {
            "No sensor data received. Test could not be completed.".to_string()
        }
    };

    StatusSnapshot {
        status,
        elapsed_time: session.elapsed_ticks(),
        average: round_2dp(session.average()),
        finished: matches!(session.lifecycle(), Lifecycle::Finished(_)),
        result: session
            .verdict()
            .map(Verdict::label)
            .unwrap_or_default()
            .to_string(),
    }
}

/// The stored aggregate keeps full precision; only the reported value is
/// rounded.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
