//! Signal smoothing for per-device RSSI streams.
//!
//! Raw RSSI readings jitter by several dBm from frame to frame. The registry
//! tracks an exponential moving average per device instead of the raw value,
//! so rendered positions drift rather than jump.

/// Default weight given to an incoming reading.
pub const DEFAULT_ALPHA: f64 = 0.2;

/// One exponential-moving-average step.
///
/// `alpha` weights the incoming reading, `1 - alpha` is retained from the
/// running average. A device's first reading seeds the average directly;
/// this step applies from the second reading on.
///
/// # Arguments
/// * `previous` - Current running average in dBm
/// * `raw` - Incoming reading in dBm
/// * `alpha` - Weight of the incoming reading, in `(0, 1]`
pub fn smooth(previous: f64, raw: f64, alpha: f64) -> f64 {
    alpha * raw + (1.0 - alpha) * previous
}

/// Parse a smoothing factor from a command line string.
///
/// Accepts values in `(0, 1]`; `1` disables smoothing entirely. Zero is
/// rejected because the average would never move.
///
/// # Arguments
/// * `src` - A string like "0.2"
///
/// # Returns
/// A Result containing the parsed factor or an error message.
pub fn parse_alpha(src: &str) -> Result<f64, String> {
    let value: f64 = src
        .trim()
        .parse()
        .map_err(|_| format!("invalid smoothing factor: {}", src))?;

    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "smoothing factor must be in (0, 1], got {}",
            value
        ))
    }
}
