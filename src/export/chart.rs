//! Line-chart rendering of readings over time.
//!
//! One polyline per reading index (RX0, RX1, ...) across every scan, x axis
//! spanning the device timestamps, y axis spanning the observed value range.
//! Rasterized directly into a PNG with small square markers at each sample;
//! no text labels.

use std::io::Cursor;

use image::{ImageBuffer, Rgb, RgbImage};

use super::ExportError;
use crate::types::Scan;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 700;
const MARGIN: u32 = 48;
const GRID_DIVISIONS: u32 = 10;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([224, 224, 224]);
const FRAME: Rgb<u8> = Rgb([64, 64, 64]);

/// Series palette, one color per reading index; wraps past the end.
const PALETTE: [Rgb<u8>; 7] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
];

/// Render the stored scans as a PNG line chart.
pub fn render_png(scans: &[Scan]) -> Result<Vec<u8>, ExportError> {
    if scans.is_empty() {
        return Err(ExportError::EmptyDataset);
    }

    let series_count = scans.iter().map(|s| s.readings.len()).max().unwrap_or(0);

    // X domain from device timestamps; fall back to sample index when all
    // timestamps coincide.
    let t_min = scans.iter().map(|s| s.timestamp).min().unwrap_or(0);
    let t_max = scans.iter().map(|s| s.timestamp).max().unwrap_or(0);
    let index_domain = t_max == t_min;

    let values = scans.iter().flat_map(|s| s.readings.iter().copied());
    let mut v_min = f64::INFINITY;
    let mut v_max = f64::NEG_INFINITY;
    for v in values {
        v_min = v_min.min(v);
        v_max = v_max.max(v);
    }
    if (v_max - v_min).abs() < f64::EPSILON {
        // Flat signal: pad the range so the line sits mid-chart
        v_min -= 1.0;
        v_max += 1.0;
    }

    let mut img: RgbImage = ImageBuffer::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    draw_grid(&mut img);

    let x_of = |scan_index: usize, timestamp: i64| -> i64 {
        let fraction = if index_domain {
            if scans.len() <= 1 {
                0.5
            } else {
                scan_index as f64 / (scans.len() - 1) as f64
            }
        } else {
            (timestamp - t_min) as f64 / (t_max - t_min) as f64
        };
        i64::from(MARGIN) + (fraction * f64::from(WIDTH - 2 * MARGIN)) as i64
    };
    let y_of = |value: f64| -> i64 {
        let fraction = (value - v_min) / (v_max - v_min);
        i64::from(HEIGHT - MARGIN) - (fraction * f64::from(HEIGHT - 2 * MARGIN)) as i64
    };

    for series in 0..series_count {
        let color = PALETTE[series % PALETTE.len()];
        let mut previous: Option<(i64, i64)> = None;
        for (i, scan) in scans.iter().enumerate() {
            let Some(&value) = scan.readings.get(series) else {
                previous = None;
                continue;
            };
            let point = (x_of(i, scan.timestamp), y_of(value));
            if let Some(prev) = previous {
                draw_line(&mut img, prev, point, color);
            }
            draw_marker(&mut img, point, color);
            previous = Some(point);
        }
    }

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(buf)
}

fn draw_grid(img: &mut RgbImage) {
    let inner_w = WIDTH - 2 * MARGIN;
    let inner_h = HEIGHT - 2 * MARGIN;

    for div in 0..=GRID_DIVISIONS {
        let x = MARGIN + div * inner_w / GRID_DIVISIONS;
        let y = MARGIN + div * inner_h / GRID_DIVISIONS;
        let color = if div == 0 || div == GRID_DIVISIONS {
            FRAME
        } else {
            GRID
        };
        for py in MARGIN..=HEIGHT - MARGIN {
            img.put_pixel(x, py, color);
        }
        for px in MARGIN..=WIDTH - MARGIN {
            img.put_pixel(px, y, color);
        }
    }
}

/// Bresenham segment clipped to the image bounds.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let (x1, y1) = to;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_clipped(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_marker(img: &mut RgbImage, center: (i64, i64), color: Rgb<u8>) {
    for dx in -1..=1 {
        for dy in -1..=1 {
            put_clipped(img, center.0 + dx, center.1 + dy, color);
        }
    }
}

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(WIDTH) && y < i64::from(HEIGHT) {
        img.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(timestamp: i64, readings: &[f64]) -> Scan {
        Scan {
            timestamp,
            channel: 0,
            readings: readings.to_vec(),
        }
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        assert!(matches!(render_png(&[]), Err(ExportError::EmptyDataset)));
    }

    #[test]
    fn test_renders_valid_png() {
        let scans = vec![
            scan(0, &[100.0, 200.0]),
            scan(1, &[150.0, 180.0]),
            scan(2, &[120.0, 260.0]),
        ];
        let png = render_png(&scans).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_single_scan_and_flat_signal() {
        // One scan with identical values exercises both degenerate domains
        let png = render_png(&[scan(5, &[42.0, 42.0])]).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
