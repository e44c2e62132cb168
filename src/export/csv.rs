//! Tabular export: one row per scan, readings flattened into `rx` columns.

use super::ExportError;
use crate::types::Scan;

/// Render scans as CSV with header `time,tx,rx0..rx{k-1}`, where `k` is the
/// widest scan in the dataset. Scans with fewer readings leave their
/// trailing cells empty.
pub fn render(scans: &[Scan]) -> Result<String, ExportError> {
    if scans.is_empty() {
        return Err(ExportError::EmptyDataset);
    }

    let width = scans.iter().map(|s| s.readings.len()).max().unwrap_or(0);

    let mut out = String::from("time,tx");
    for i in 0..width {
        out.push_str(&format!(",rx{i}"));
    }
    out.push('\n');

    for scan in scans {
        out.push_str(&format!("{},{}", scan.timestamp, scan.channel));
        for i in 0..width {
            out.push(',');
            if let Some(value) = scan.readings.get(i) {
                out.push_str(&value.to_string());
            }
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(timestamp: i64, channel: u32, readings: &[f64]) -> Scan {
        Scan {
            timestamp,
            channel,
            readings: readings.to_vec(),
        }
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        assert!(matches!(render(&[]), Err(ExportError::EmptyDataset)));
    }

    #[test]
    fn test_header_and_rows() {
        let scans = vec![scan(10, 0, &[1.5, 2.0]), scan(11, 1, &[3.0, 4.0])];
        let csv = render(&scans).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "time,tx,rx0,rx1");
        assert_eq!(lines[1], "10,0,1.5,2");
        assert_eq!(lines[2], "11,1,3,4");
    }

    #[test]
    fn test_ragged_scans_pad_with_empty_cells() {
        let scans = vec![scan(1, 0, &[1.0, 2.0, 3.0]), scan(2, 0, &[9.0])];
        let csv = render(&scans).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "time,tx,rx0,rx1,rx2");
        assert_eq!(lines[2], "2,0,9,,");
    }
}
