//! The single active test session: configuration, accumulated scans,
//! elapsed ticks, aggregate average, and final verdict.
//!
//! Lifecycle is `Idle → Running → Finished`. `start` always succeeds and
//! overwrites any prior session, including one still running. Time advances
//! one tick per status poll; nothing here touches the wall clock.

use thiserror::Error;
use tracing::info;

use crate::session::{classifier, clock};
use crate::types::{ClassificationKind, Scan, Verdict};

// ============================================================================
// Session Configuration
// ============================================================================

/// Rejected test parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    #[error("'duration' must be at least 1 second per phase (got {0})")]
    PhaseDuration(u32),

    #[error("'cycles' must be at least 1 (got {0})")]
    Cycles(u32),
}

/// Test parameters supplied at start. Immutable for the lifetime of one
/// session; replaced wholesale on each `start`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub kind: ClassificationKind,
    pub cycles: u32,
    pub phase_duration_secs: u32,
    pub soft_threshold: f64,
    pub fresh_threshold: f64,
}

impl SessionConfig {
    /// Build a validated config. Zero cycles or a zero phase duration would
    /// make the phase clock divide by zero, so both are rejected here.
    pub fn new(
        kind: ClassificationKind,
        cycles: u32,
        phase_duration_secs: u32,
        soft_threshold: f64,
        fresh_threshold: f64,
    ) -> Result<Self, InvalidConfig> {
        if phase_duration_secs < 1 {
            return Err(InvalidConfig::PhaseDuration(phase_duration_secs));
        }
        if cycles < 1 {
            return Err(InvalidConfig::Cycles(cycles));
        }
        Ok(Self {
            kind,
            cycles,
            phase_duration_secs,
            soft_threshold,
            fresh_threshold,
        })
    }
}

impl Default for SessionConfig {
    /// Placeholder installed before the first `start`; mirrors the device
    /// frontend defaults.
    fn default() -> Self {
        Self {
            kind: ClassificationKind::SoftHard,
            cycles: 3,
            phase_duration_secs: 5,
            soft_threshold: 350.0,
            fresh_threshold: 750.0,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Ran to its configured duration with data
    Completed,
    /// Ran to its configured duration without a single scan
    NoData,
    /// Operator forced the end; no verdict was computed
    Stopped,
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Finished(FinishReason),
}

// ============================================================================
// Test Session
// ============================================================================

/// The process-wide test session. Exactly one exists at a time; the API
/// layer wraps it in `Arc<RwLock<_>>` so sensor appends and poll-driven
/// advances are atomic with respect to each other.
#[derive(Debug)]
pub struct TestSession {
    lifecycle: Lifecycle,
    config: SessionConfig,
    scans: Vec<Scan>,
    elapsed_ticks: u64,
    average: f64,
    verdict: Option<Verdict>,
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSession {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            config: SessionConfig::default(),
            scans: Vec::new(),
            elapsed_ticks: 0,
            average: 0.0,
            verdict: None,
        }
    }

    /// Start a new test, replacing any prior session. Scans accumulated
    /// before this call (orphans from an eager device) are discarded.
    pub fn start(&mut self, config: SessionConfig) {
        if self.lifecycle == Lifecycle::Running {
            info!("start requested over an active test - replacing it");
        }
        self.lifecycle = Lifecycle::Running;
        self.config = config;
        self.scans.clear();
        self.elapsed_ticks = 0;
        self.average = 0.0;
        self.verdict = None;
        info!(
            kind = %self.config.kind.display_name(),
            cycles = self.config.cycles,
            phase_duration_secs = self.config.phase_duration_secs,
            "test started"
        );
    }

    /// Force the session to `Finished` without computing a verdict.
    /// Idempotent: a second stop (or a stop after natural completion)
    /// leaves the terminal state untouched.
    pub fn stop(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Finished(_)) {
            return;
        }
        self.lifecycle = Lifecycle::Finished(FinishReason::Stopped);
        info!(elapsed_ticks = self.elapsed_ticks, "test stopped by operator");
    }

    /// Append canonical scans in arrival order. Allowed in any lifecycle
    /// state; scans ingested before a `start` are cleared by that `start`.
    pub fn ingest(&mut self, scans: Vec<Scan>) {
        self.scans.extend(scans);
    }

    /// Advance one tick of test time. Called once per status poll; a poll
    /// on an idle or finished session is a pure read and must not call this
    /// twice for one poll.
    pub fn advance(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }

        self.elapsed_ticks += 1;
        self.average = mean_of_readings(&self.scans);

        if clock::is_complete(
            self.elapsed_ticks,
            self.config.cycles,
            self.config.phase_duration_secs,
        ) {
            if self.scans.is_empty() {
                self.lifecycle = Lifecycle::Finished(FinishReason::NoData);
                self.verdict = Some(Verdict::NoResult);
            } else {
                let verdict = classifier::classify(
                    self.average,
                    &self.config.kind,
                    self.config.soft_threshold,
                    self.config.fresh_threshold,
                );
                self.lifecycle = Lifecycle::Finished(FinishReason::Completed);
                self.verdict = Some(verdict);
            }
            info!(
                elapsed_ticks = self.elapsed_ticks,
                scans = self.scans.len(),
                verdict = self.verdict.map(Verdict::label).unwrap_or(""),
                "test finished"
            );
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Aggregate average over every individual reading value, recomputed on
    /// the most recent advance. Zero when no scans are stored.
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }
}

/// Arithmetic mean of every reading value across every scan, flattened.
/// Order-independent by construction; 0 for an empty dataset.
fn mean_of_readings(scans: &[Scan]) -> f64 {
    let mut sum = 0.0;
    let mut count: usize = 0;
    for scan in scans {
        for value in &scan.readings {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft_hard_config(cycles: u32, duration: u32, threshold: f64) -> SessionConfig {
        SessionConfig::new(ClassificationKind::SoftHard, cycles, duration, threshold, 750.0)
            .unwrap()
    }

    fn scan(timestamp: i64, readings: &[f64]) -> Scan {
        Scan {
            timestamp,
            channel: 0,
            readings: readings.to_vec(),
        }
    }

    #[test]
    fn test_config_validation_rejects_zero() {
        let zero_duration =
            SessionConfig::new(ClassificationKind::SoftHard, 3, 0, 350.0, 750.0);
        assert_eq!(zero_duration.unwrap_err(), InvalidConfig::PhaseDuration(0));

        let zero_cycles =
            SessionConfig::new(ClassificationKind::SoftHard, 0, 5, 350.0, 750.0);
        assert_eq!(zero_cycles.unwrap_err(), InvalidConfig::Cycles(0));
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = TestSession::new();
        assert_eq!(session.lifecycle(), Lifecycle::Idle);
        assert_eq!(session.elapsed_ticks(), 0);
        assert!(session.verdict().is_none());
    }

    #[test]
    fn test_start_resets_prior_state() {
        let mut session = TestSession::new();
        session.ingest(vec![scan(1, &[100.0])]);
        session.start(soft_hard_config(1, 2, 100.0));
        session.advance();

        // Restart wipes scans, ticks, and verdict
        session.start(soft_hard_config(2, 3, 100.0));
        assert_eq!(session.lifecycle(), Lifecycle::Running);
        assert!(session.scans().is_empty());
        assert_eq!(session.elapsed_ticks(), 0);
        assert_eq!(session.average(), 0.0);
        assert!(session.verdict().is_none());
    }

    #[test]
    fn test_orphan_scans_cleared_by_start() {
        let mut session = TestSession::new();
        session.ingest(vec![scan(1, &[1.0]), scan(2, &[2.0])]);
        assert_eq!(session.scans().len(), 2);

        session.start(soft_hard_config(1, 1, 100.0));
        assert!(session.scans().is_empty());
    }

    #[test]
    fn test_runs_to_hard_verdict() {
        let mut session = TestSession::new();
        session.start(soft_hard_config(1, 2, 100.0));
        for t in 0..4 {
            session.ingest(vec![scan(t, &[150.0])]);
        }

        for _ in 0..3 {
            session.advance();
            assert_eq!(session.lifecycle(), Lifecycle::Running);
        }
        session.advance();
        assert_eq!(session.lifecycle(), Lifecycle::Finished(FinishReason::Completed));
        assert_eq!(session.verdict(), Some(Verdict::Hard));
        assert_eq!(session.average(), 150.0);
    }

    #[test]
    fn test_advance_is_noop_after_finish() {
        let mut session = TestSession::new();
        session.start(soft_hard_config(1, 1, 100.0));
        session.ingest(vec![scan(0, &[50.0])]);
        session.advance();
        session.advance();

        assert_eq!(session.elapsed_ticks(), 2);
        for _ in 0..10 {
            session.advance();
        }
        assert_eq!(session.elapsed_ticks(), 2);
        assert_eq!(session.verdict(), Some(Verdict::Soft));
    }

    #[test]
    fn test_stop_skips_classifier() {
        let mut session = TestSession::new();
        session.start(soft_hard_config(3, 5, 100.0));
        session.ingest(vec![scan(0, &[500.0])]);
        session.stop();

        assert_eq!(session.lifecycle(), Lifecycle::Finished(FinishReason::Stopped));
        assert!(session.verdict().is_none());

        // Idempotent, and never upgrades to a verdict
        session.stop();
        assert_eq!(session.lifecycle(), Lifecycle::Finished(FinishReason::Stopped));
    }

    #[test]
    fn test_no_data_completion() {
        let mut session = TestSession::new();
        session.start(soft_hard_config(1, 1, 100.0));
        session.advance();
        session.advance();

        assert_eq!(session.lifecycle(), Lifecycle::Finished(FinishReason::NoData));
        assert_eq!(session.verdict(), Some(Verdict::NoResult));
    }

    #[test]
    fn test_mean_flattens_all_readings() {
        let scans = vec![scan(0, &[1.0, 2.0, 3.0]), scan(1, &[4.0])];
        assert_eq!(mean_of_readings(&scans), 2.5);
        assert_eq!(mean_of_readings(&[]), 0.0);
    }

    #[test]
    fn test_mean_is_order_independent() {
        let forward = vec![scan(0, &[1.0, 2.0]), scan(1, &[3.0, 4.0])];
        let reversed: Vec<Scan> = forward.iter().rev().cloned().collect();
        assert_eq!(mean_of_readings(&forward), mean_of_readings(&reversed));
    }
}
