//! Snapshot rendering.
//!
//! This module provides a trait for turning registry snapshots into frame
//! text and a plain-text implementation. The formatter is a seam: richer
//! frontends (TUI, canvas) can render the same snapshots without touching
//! the pipeline.

use crate::projection::{DistanceScale, PathLossModel, RING_MARKS_METERS};
use crate::registry::DeviceRecord;
use crate::vendor;
use std::fmt;
use std::time::Instant;

/// Signals above this are a device in the same room.
pub const STRONG_ABOVE: f64 = -50.0;
/// Signals above this are nearby; below is the edge of reception.
pub const MEDIUM_ABOVE: f64 = -75.0;

/// Cells in the strength bar.
const BAR_WIDTH: usize = 10;

/// Coarse strength classification used for row styling and decluttering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBand {
    Strong,
    Medium,
    Weak,
}

impl SignalBand {
    /// Classify a smoothed signal level.
    pub fn of(signal: f64) -> Self {
        if signal > STRONG_ABOVE {
            SignalBand::Strong
        } else if signal > MEDIUM_ABOVE {
            SignalBand::Medium
        } else {
            SignalBand::Weak
        }
    }
}

impl fmt::Display for SignalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalBand::Strong => write!(f, "strong"),
            SignalBand::Medium => write!(f, "medium"),
            SignalBand::Weak => write!(f, "weak"),
        }
    }
}

/// Fraction of full strength, clamped to `[0, 1]`.
///
/// Maps -100 dBm to 0 and -30 dBm to 1.
pub fn signal_fraction(signal: f64) -> f64 {
    ((signal + 100.0) / 70.0).clamp(0.0, 1.0)
}

fn bar(signal: f64) -> String {
    let filled = (signal_fraction(signal) * BAR_WIDTH as f64) as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Trait for rendering registry snapshots into displayable text.
pub trait SnapshotFormatter: Send + Sync {
    /// Once-per-session preamble, e.g. the calibration ring table.
    fn header(&self) -> String;

    /// Render one frame.
    ///
    /// # Arguments
    /// * `devices` - Snapshot records, already in display order
    /// * `tail` - Recent raw feed lines, oldest first
    /// * `now` - Frame time, for "seen Ns ago" ages
    fn frame(&self, devices: &[DeviceRecord], tail: &[String], now: Instant) -> String;
}

/// Plain-text formatter.
///
/// One row per device worth looking at. Unnamed devices at the edge of
/// reception are aggregated into a single faint count so a busy street
/// does not drown the watch list; an expanded device always gets its row.
pub struct TextFormatter {
    scale: DistanceScale,
    model: PathLossModel,
}

impl TextFormatter {
    pub fn new(scale: DistanceScale, model: PathLossModel) -> Self {
        TextFormatter { scale, model }
    }

    fn device_row(&self, record: &DeviceRecord) -> String {
        let marker = if record.is_known { '*' } else { ' ' };
        let band = SignalBand::of(record.smoothed_signal);
        let distance = self.scale.signal_to_distance(record.smoothed_signal);
        format!(
            "{} {:<18} {:>6.1} dBm  [{}] {:<6} at {:>3.0}",
            marker,
            record.display_name,
            record.smoothed_signal,
            bar(record.smoothed_signal),
            band,
            distance,
        )
    }

    fn detail_row(&self, record: &DeviceRecord, now: Instant) -> String {
        let seen = now.duration_since(record.last_seen).as_secs();
        format!(
            "    {}  {}  seen {}s ago  bearing {:.0} deg",
            record.mac,
            vendor::label(&record.mac),
            seen,
            record.angle.to_degrees(),
        )
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        TextFormatter::new(DistanceScale::default(), PathLossModel::default())
    }
}

impl SnapshotFormatter for TextFormatter {
    fn header(&self) -> String {
        let mut lines = vec!["calibration rings".to_string()];
        for meters in RING_MARKS_METERS {
            let signal = self.model.signal_at(meters);
            if !self.scale.in_range(signal) {
                continue;
            }
            lines.push(format!(
                "  {:>4.0} m  at {:>3.0}  ({:.1} dBm)",
                meters,
                self.scale.signal_to_distance(signal),
                signal,
            ));
        }
        lines.join("\n") + "\n"
    }

    fn frame(&self, devices: &[DeviceRecord], tail: &[String], now: Instant) -> String {
        let label = if devices.len() == 1 { "device" } else { "devices" };
        let mut lines = vec![format!("-- {} {} --", devices.len(), label)];

        let mut faint = 0;
        for record in devices {
            let prominent = record.is_known
                || record.detail_expanded
                || SignalBand::of(record.smoothed_signal) != SignalBand::Weak;
            if !prominent {
                faint += 1;
                continue;
            }

            lines.push(self.device_row(record));
            if record.detail_expanded {
                lines.push(self.detail_row(record, now));
            }
        }

        if faint > 0 {
            lines.push(format!("  (+{faint} faint)"));
        }

        if !tail.is_empty() {
            lines.push("-- feed --".to_string());
            lines.extend(tail.iter().cloned());
        }

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceRecord;

    fn record(mac: &str, name: &str, known: bool, signal: f64) -> DeviceRecord {
        DeviceRecord {
            mac: mac.parse().unwrap(),
            display_name: name.to_string(),
            is_known: known,
            smoothed_signal: signal,
            last_seen: Instant::now(),
            angle: 1.0,
            detail_expanded: false,
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(SignalBand::of(-49.9), SignalBand::Strong);
        assert_eq!(SignalBand::of(-50.0), SignalBand::Medium);
        assert_eq!(SignalBand::of(-74.9), SignalBand::Medium);
        assert_eq!(SignalBand::of(-75.0), SignalBand::Weak);
        assert_eq!(SignalBand::of(-95.0), SignalBand::Weak);
    }

    #[test]
    fn test_signal_fraction() {
        assert_eq!(signal_fraction(-100.0), 0.0);
        assert_eq!(signal_fraction(-30.0), 1.0);
        assert!((signal_fraction(-65.0) - 0.5).abs() < 1e-9);
        // Clamped outside the range
        assert_eq!(signal_fraction(-10.0), 1.0);
        assert_eq!(signal_fraction(-120.0), 0.0);
    }

    #[test]
    fn test_bar_extremes() {
        assert_eq!(bar(-30.0), "##########");
        assert_eq!(bar(-100.0), "..........");
    }

    #[test]
    fn test_header_lists_rings() {
        let header = TextFormatter::default().header();
        assert!(header.starts_with("calibration rings\n"));
        // 1 m ring models -45 dBm, shown at 110 under default calibration
        assert!(header.contains("1 m  at 110  (-45.0 dBm)"));
        assert_eq!(header.lines().count(), 1 + RING_MARKS_METERS.len());
    }

    #[test]
    fn test_header_omits_out_of_range_rings() {
        let steep = PathLossModel {
            exponent: 5.0,
            reference_signal: -60.0,
        };
        // 20 m models far below the calibration range
        let header = TextFormatter::new(DistanceScale::default(), steep).header();
        assert!(header.lines().count() < 1 + RING_MARKS_METERS.len());
    }

    #[test]
    fn test_frame_rows() {
        let devices = vec![
            record("a0cc2b775e0a", "Kitchen tablet", true, -44.0),
            record("1848cada4d26", "unknown (4d26)", false, -60.0),
        ];
        let frame = TextFormatter::default().frame(&devices, &[], Instant::now());

        assert!(frame.starts_with("-- 2 devices --\n"));
        assert!(frame.contains("* Kitchen tablet"));
        assert!(frame.contains("-44.0 dBm"));
        assert!(frame.contains("strong"));
        assert!(frame.contains("  unknown (4d26)"));
        assert!(frame.ends_with('\n'));
    }

    #[test]
    fn test_frame_single_device_label() {
        let devices = vec![record("a0cc2b775e0a", "Kitchen tablet", true, -44.0)];
        let frame = TextFormatter::default().frame(&devices, &[], Instant::now());
        assert!(frame.starts_with("-- 1 device --\n"));
    }

    #[test]
    fn test_weak_unknown_devices_are_aggregated() {
        let devices = vec![
            record("a0cc2b775e0a", "Kitchen tablet", true, -82.0),
            record("aabbccddee01", "unknown (ee01)", false, -85.0),
            record("aabbccddee02", "unknown (ee02)", false, -88.0),
        ];
        let frame = TextFormatter::default().frame(&devices, &[], Instant::now());

        // The known one keeps its row even when weak
        assert!(frame.contains("* Kitchen tablet"));
        assert!(!frame.contains("unknown (ee01)"));
        assert!(frame.contains("(+2 faint)"));
    }

    #[test]
    fn test_expanded_device_shows_detail() {
        let mut expanded = record("a0cc2b775e0a", "unknown (5e0a)", false, -88.0);
        expanded.detail_expanded = true;
        let now = expanded.last_seen + std::time::Duration::from_secs(3);

        let frame = TextFormatter::default().frame(&[expanded], &[], now);
        // Expanded overrides the faint aggregation
        assert!(frame.contains("unknown (5e0a)"));
        assert!(frame.contains("a0cc2b775e0a  Samsung  seen 3s ago"));
        assert!(frame.contains("bearing 57 deg"));
    }

    #[test]
    fn test_device_row_lands_on_matching_ring() {
        let formatter = TextFormatter::default();
        // A device whose smoothed signal equals a ring's modeled signal sits
        // exactly on that ring
        let device = record("a0cc2b775e0a", "Kitchen tablet", true, -45.0);
        let frame = formatter.frame(&[device], &[], Instant::now());

        assert!(formatter.header().contains("1 m  at 110"));
        assert!(frame.contains("at 110"));
    }

    #[test]
    fn test_frame_appends_tail() {
        let tail = vec![
            "FT: 2 FST: 0 SRC: aabbccddeeff RSSI: -50".to_string(),
            "FT: 0 FST: 8 SRC: 3c5ab401cc90 RSSI: -45".to_string(),
        ];
        let frame = TextFormatter::default().frame(&[], &tail, Instant::now());

        assert!(frame.contains("-- 0 devices --"));
        let feed_at = frame.find("-- feed --").unwrap();
        assert!(frame[feed_at..].contains("FT: 2 FST: 0"));
        assert!(frame[feed_at..].contains("FT: 0 FST: 8"));
    }

    #[test]
    fn test_frame_without_tail_has_no_feed_block() {
        let frame = TextFormatter::default().frame(&[], &[], Instant::now());
        assert!(!frame.contains("-- feed --"));
    }
}
