//! Signal-to-distance projection.
//!
//! Two models cooperate here. [`DistanceScale`] is the display calibration:
//! a clamped linear map between a signal range and a distance range, with an
//! exact inverse. [`PathLossModel`] is the physical log-distance model used
//! to place calibration rings at real-world distances. A ring for `m` meters
//! is drawn at `signal_to_distance(signal_at(m))`, so a device whose
//! smoothed signal equals the modeled signal sits exactly on the ring.

/// Signal mapped to the nearest displayed distance, in dBm.
pub const DEFAULT_NEAR_SIGNAL: f64 = -30.0;
/// Signal mapped to the farthest displayed distance, in dBm.
pub const DEFAULT_FAR_SIGNAL: f64 = -90.0;
/// Distance a device at [`DEFAULT_NEAR_SIGNAL`] is shown at.
pub const DEFAULT_MIN_DISTANCE: f64 = 30.0;
/// Distance a device at [`DEFAULT_FAR_SIGNAL`] is shown at.
pub const DEFAULT_MAX_DISTANCE: f64 = 350.0;

/// Default path loss exponent; 2.0 is free space, indoor clutter runs higher.
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.5;
/// Default expected signal one meter from the transmitter, in dBm.
pub const DEFAULT_REFERENCE_SIGNAL: f64 = -45.0;

/// Real-world distances the calibration rings mark, in meters.
pub const RING_MARKS_METERS: [f64; 5] = [1.0, 3.0, 5.0, 10.0, 20.0];

/// Linear calibration between a signal range and a displayed distance range.
///
/// Signals outside `[far_signal, near_signal]` clamp to the range edges, so
/// every device gets a position even when readings spike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceScale {
    /// Signal shown at `min_distance`, in dBm
    pub near_signal: f64,
    /// Signal shown at `max_distance`, in dBm
    pub far_signal: f64,
    /// Closest displayed distance
    pub min_distance: f64,
    /// Farthest displayed distance
    pub max_distance: f64,
}

impl Default for DistanceScale {
    fn default() -> Self {
        DistanceScale {
            near_signal: DEFAULT_NEAR_SIGNAL,
            far_signal: DEFAULT_FAR_SIGNAL,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

impl DistanceScale {
    /// Check the calibration relations the mapping relies on.
    ///
    /// Both directions clamp into the configured ranges, which requires
    /// finite bounds with `far_signal < near_signal` and
    /// `min_distance < max_distance`.
    pub fn validate(&self) -> Result<(), String> {
        let bounds = [
            ("near-signal", self.near_signal),
            ("far-signal", self.far_signal),
            ("min-distance", self.min_distance),
            ("max-distance", self.max_distance),
        ];
        for (name, value) in bounds {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.far_signal >= self.near_signal {
            return Err(format!(
                "far-signal ({}) must be below near-signal ({})",
                self.far_signal, self.near_signal
            ));
        }
        if self.min_distance >= self.max_distance {
            return Err(format!(
                "min-distance ({}) must be below max-distance ({})",
                self.min_distance, self.max_distance
            ));
        }
        Ok(())
    }

    /// Map a signal to a displayed distance.
    ///
    /// Stronger signals land closer. Input clamps to the calibration range.
    pub fn signal_to_distance(&self, signal: f64) -> f64 {
        let clamped = signal.clamp(self.far_signal, self.near_signal);
        let fraction = (self.near_signal - clamped) / (self.near_signal - self.far_signal);
        self.min_distance + fraction * (self.max_distance - self.min_distance)
    }

    /// Map a displayed distance back to the signal that would produce it.
    ///
    /// Exact inverse of [`signal_to_distance`](Self::signal_to_distance)
    /// within the distance range; input clamps to it.
    pub fn distance_to_signal(&self, distance: f64) -> f64 {
        let clamped = distance.clamp(self.min_distance, self.max_distance);
        let fraction = (clamped - self.min_distance) / (self.max_distance - self.min_distance);
        self.near_signal - fraction * (self.near_signal - self.far_signal)
    }

    /// Whether a signal falls inside the calibration range. Rings modeling
    /// signals outside it would pile up at the range edges, so they are
    /// skipped instead.
    pub fn in_range(&self, signal: f64) -> bool {
        signal >= self.far_signal && signal <= self.near_signal
    }
}

/// Log-distance path loss model for converting real-world distances into
/// expected signal strengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossModel {
    /// Path loss exponent (environment dependent)
    pub exponent: f64,
    /// Expected signal at one meter, in dBm
    pub reference_signal: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        PathLossModel {
            exponent: DEFAULT_PATH_LOSS_EXPONENT,
            reference_signal: DEFAULT_REFERENCE_SIGNAL,
        }
    }
}

impl PathLossModel {
    /// Expected signal `meters` away from the transmitter.
    ///
    /// Distances at or below zero have no physical meaning under the log
    /// model and yield the reference signal.
    pub fn signal_at(&self, meters: f64) -> f64 {
        if meters <= 0.0 {
            return self.reference_signal;
        }
        self.reference_signal - 10.0 * self.exponent * meters.log10()
    }
}
