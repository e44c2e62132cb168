//! Core domain types shared by the session engine, API layer, and exports.

use serde::{Deserialize, Serialize};

// ============================================================================
// Scan
// ============================================================================

/// One timestamped multi-channel sensor reading event.
///
/// `timestamp` is device-supplied and monotonic within a session; it is not
/// required to start at zero. `readings` is never empty once a scan has been
/// accepted by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    /// Device timestamp
    pub timestamp: i64,
    /// Transmit channel the readings belong to
    pub channel: u32,
    /// Raw resistance/capacitance values for this channel
    pub readings: Vec<f64>,
}

// ============================================================================
// Classification Kind
// ============================================================================

/// Which binary classification a test produces.
///
/// The start request carries this as a free-form string. Unrecognized values
/// are kept verbatim so status strings can still display them; the classifier
/// resolves them to the sentinel verdict instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationKind {
    SoftHard,
    FreshRotten,
    Other(String),
}

impl ClassificationKind {
    /// Parse the wire string (`"soft_hard"`, `"fresh_rotten"`, or anything else).
    pub fn parse(raw: &str) -> Self {
        match raw {
            "soft_hard" => Self::SoftHard,
            "fresh_rotten" => Self::FreshRotten,
            other => Self::Other(other.to_string()),
        }
    }

    /// Title-cased name used in running status strings, e.g. `"Soft Hard"`.
    pub fn display_name(&self) -> String {
        let raw = match self {
            Self::SoftHard => "soft_hard",
            Self::FreshRotten => "fresh_rotten",
            Self::Other(raw) => raw.as_str(),
        };
        title_case(raw)
    }
}

/// Replace underscores with spaces and capitalize each word.
fn title_case(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Verdict
// ============================================================================

/// Final classification label produced when a test completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Soft,
    Hard,
    Fresh,
    Rotten,
    /// Test completed without any sensor data
    NoResult,
    /// Configured classification type was not recognized
    UnknownKind,
}

impl Verdict {
    /// Wire label shown to the operator.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Soft => "Soft",
            Self::Hard => "Hard",
            Self::Fresh => "Fresh",
            Self::Rotten => "Rotten",
            Self::NoResult => "No Result",
            Self::UnknownKind => "Unknown Classification Type",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_kind_parse() {
        assert_eq!(ClassificationKind::parse("soft_hard"), ClassificationKind::SoftHard);
        assert_eq!(ClassificationKind::parse("fresh_rotten"), ClassificationKind::FreshRotten);
        assert_eq!(
            ClassificationKind::parse("wet_dry"),
            ClassificationKind::Other("wet_dry".to_string())
        );
    }

    #[test]
    fn test_display_name_title_cases() {
        assert_eq!(ClassificationKind::SoftHard.display_name(), "Soft Hard");
        assert_eq!(ClassificationKind::FreshRotten.display_name(), "Fresh Rotten");
        assert_eq!(
            ClassificationKind::Other("wet_dry".to_string()).display_name(),
            "Wet Dry"
        );
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::NoResult.label(), "No Result");
        assert_eq!(Verdict::UnknownKind.label(), "Unknown Classification Type");
        assert_eq!(format!("{}", Verdict::Hard), "Hard");
    }
}
