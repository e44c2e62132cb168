//! Verdict rules: map the aggregate average to a classification label.

use crate::types::{ClassificationKind, Verdict};

/// Classify the aggregate average against the configured thresholds.
///
/// Comparisons are strict (`>`); an average exactly equal to the threshold
/// takes the lower-valued label. An unrecognized classification type yields
/// the sentinel [`Verdict::UnknownKind`], not an error.
///
/// The empty-dataset short circuit (no scans ever ingested → `No Result`)
/// happens in the session state machine before this function is reached.
pub fn classify(
    average: f64,
    kind: &ClassificationKind,
    soft_threshold: f64,
    fresh_threshold: f64,
) -> Verdict {
    match kind {
        ClassificationKind::FreshRotten => {
            if average > fresh_threshold {
                Verdict::Rotten
            } else {
                Verdict::Fresh
            }
        }
        ClassificationKind::SoftHard => {
            if average > soft_threshold {
                Verdict::Hard
            } else {
                Verdict::Soft
            }
        }
        ClassificationKind::Other(_) => Verdict::UnknownKind,
    }
}
