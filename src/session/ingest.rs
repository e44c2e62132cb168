//! Sensor payload normalization.
//!
//! The device reports scans in one of three equivalent wire shapes:
//! a single JSON scan `{time, tx, rx: [...]}`, a multi-scan JSON envelope
//! `{time, samples: [{tx, rx: [...]}, ...]}` sharing one timestamp, or a
//! flat comma-delimited numeric record
//! `time, tx0, rx0_0..rx0_{k-1}, tx1, ...` for a fixed channel count.
//!
//! All three decode here, in one normalization step, to the same canonical
//! [`Scan`] sequence. A failed decode leaves the session untouched.

use serde::Deserialize;
use thiserror::Error;

use crate::types::Scan;

/// Ingestion errors. Both are recovered at the HTTP boundary; neither
/// corrupts previously stored scans.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("flat record has {found} values, expected {expected}")]
    ArityMismatch { expected: usize, found: usize },
}

// ============================================================================
// JSON shapes
// ============================================================================

/// The two JSON wire shapes. `Burst` is tried first so an envelope carrying
/// a `samples` array is never misread as a single scan.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPayload {
    Burst { time: i64, samples: Vec<ChannelSample> },
    Single { time: i64, tx: u32, rx: Vec<f64> },
}

#[derive(Debug, Deserialize)]
struct ChannelSample {
    tx: u32,
    rx: Vec<f64>,
}

/// Decode a JSON payload (single scan or multi-scan envelope).
pub fn parse_json(body: &str) -> Result<Vec<Scan>, IngestError> {
    let payload: JsonPayload = serde_json::from_str(body).map_err(|_| {
        IngestError::MalformedPayload(
            "expected {time, tx, rx} or {time, samples} with numeric values".to_string(),
        )
    })?;

    let scans = match payload {
        JsonPayload::Single { time, tx, rx } => vec![Scan {
            timestamp: time,
            channel: tx,
            readings: rx,
        }],
        JsonPayload::Burst { time, samples } => samples
            .into_iter()
            .map(|sample| Scan {
                timestamp: time,
                channel: sample.tx,
                readings: sample.rx,
            })
            .collect(),
    };

    if scans.is_empty() {
        return Err(IngestError::MalformedPayload(
            "'samples' must contain at least one scan".to_string(),
        ));
    }
    if scans.iter().any(|scan| scan.readings.is_empty()) {
        return Err(IngestError::MalformedPayload(
            "'rx' must contain at least one reading".to_string(),
        ));
    }

    Ok(scans)
}

// ============================================================================
// Flat delimited records
// ============================================================================

/// Decode one flat comma-delimited record for a fixed device geometry.
///
/// Element count must equal `1 + channels × (1 + readings_per_channel)`:
/// one shared timestamp, then per channel one channel id followed by its
/// reading values.
pub fn parse_flat(
    record: &str,
    channels: usize,
    readings_per_channel: usize,
) -> Result<Vec<Scan>, IngestError> {
    let fields: Vec<&str> = record.trim().split(',').map(str::trim).collect();
    let expected = 1 + channels * (1 + readings_per_channel);
    if fields.len() != expected {
        return Err(IngestError::ArityMismatch {
            expected,
            found: fields.len(),
        });
    }

    let timestamp: i64 = fields[0]
        .parse()
        .map_err(|_| malformed_field("time", fields[0]))?;

    let mut scans = Vec::with_capacity(channels);
    let mut next = 1;
    for _ in 0..channels {
        let channel: u32 = fields[next]
            .parse()
            .map_err(|_| malformed_field("tx", fields[next]))?;
        next += 1;

        let mut readings = Vec::with_capacity(readings_per_channel);
        for _ in 0..readings_per_channel {
            let value: f64 = fields[next]
                .parse()
                .map_err(|_| malformed_field("rx", fields[next]))?;
            readings.push(value);
            next += 1;
        }

        scans.push(Scan {
            timestamp,
            channel,
            readings,
        });
    }

    Ok(scans)
}

fn malformed_field(field: &str, value: &str) -> IngestError {
    IngestError::MalformedPayload(format!("'{field}' value '{value}' is not numeric"))
}

// ============================================================================
// Shape selection
// ============================================================================

/// Normalize any supported payload into canonical scans.
///
/// Bodies that look like JSON objects take the JSON path; everything else is
/// treated as one flat delimited record for the configured device geometry.
pub fn normalize(
    body: &str,
    channels: usize,
    readings_per_channel: usize,
) -> Result<Vec<Scan>, IngestError> {
    if body.trim_start().starts_with('{') {
        parse_json(body)
    } else {
        parse_flat(body, channels, readings_per_channel)
    }
}
