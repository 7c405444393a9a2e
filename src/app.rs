//! Core application runner (business logic) for `wifi-sentinel`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit
//! codes so it can be tested deterministically. The run loop is a frame
//! clock: each tick folds a bounded batch of feed events into the registry,
//! applies pending display interactions, evicts stale devices and renders
//! one snapshot frame.

use crate::alias::{self, Alias};
use crate::frame::ParseStrategy;
use crate::mac_address::MacAddress;
use crate::projection::{
    DEFAULT_FAR_SIGNAL, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE, DEFAULT_NEAR_SIGNAL,
    DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_SIGNAL, DistanceScale, PathLossModel,
};
use crate::registry::{self, DeviceRegistry, RegistrySettings};
use crate::render::{SnapshotFormatter, TextFormatter};
use crate::smoothing;
use crate::source::Backend;
use crate::worker::{self, IngestEvent, NoiseFilter, Termination};
use clap::Parser;
use log::warn;
use std::collections::VecDeque;
use std::io;
use std::io::Write;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::MissedTickBehavior;

/// Most feed events folded into the registry per frame, so a chatty feed
/// cannot starve rendering.
const FRAME_DRAIN_CAP: usize = 20;

/// Depth of the raw feed panel.
const TAIL_PANEL_LINES: usize = 12;

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Feed backend to read sniffer output from
    #[arg(long, default_value_t, value_enum)]
    pub backend: Backend,

    /// Serial device the sniffer is attached to
    #[arg(long, default_value = crate::source::DEFAULT_PORT)]
    pub port: String,

    /// Serial line rate
    #[arg(long, default_value_t = crate::source::DEFAULT_BAUD)]
    pub baud: u32,

    /// Recorded feed to replay, or "-" for stdin
    #[arg(long, default_value = crate::source::replay::STDIN_PATH)]
    pub input: String,

    /// Specify human-readable alias for a device address.
    /// Format: --alias a0cc2b775e0a=Kitchen tablet
    #[arg(long = "alias", value_parser = crate::alias::parse_alias, value_name = "ALIAS")]
    pub aliases: Vec<Alias>,

    /// Field extraction strategy for frame lines
    #[arg(long, default_value_t, value_enum)]
    pub strategy: ParseStrategy,

    /// Smoothing factor for the running signal average, in (0, 1].
    /// Smaller values react more slowly but jitter less.
    #[arg(long, value_parser = crate::smoothing::parse_alpha, default_value_t = smoothing::DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Evict devices unseen for this long.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, value_parser = parse_duration, default_value = "10s")]
    pub timeout: Duration,

    /// Drop readings strictly below this dBm level
    #[arg(long, default_value_t = worker::DEFAULT_SIGNAL_FLOOR, allow_negative_numbers = true)]
    pub floor: i32,

    /// Track access point beacons instead of dropping them
    #[arg(long)]
    pub keep_beacons: bool,

    /// Signal shown at the closest display distance, in dBm
    #[arg(long, default_value_t = DEFAULT_NEAR_SIGNAL, allow_negative_numbers = true)]
    pub near_signal: f64,

    /// Signal shown at the farthest display distance, in dBm
    #[arg(long, default_value_t = DEFAULT_FAR_SIGNAL, allow_negative_numbers = true)]
    pub far_signal: f64,

    /// Closest displayed distance
    #[arg(long, default_value_t = DEFAULT_MIN_DISTANCE)]
    pub min_distance: f64,

    /// Farthest displayed distance
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
    pub max_distance: f64,

    /// Path loss exponent for the calibration rings; 2.0 is free space,
    /// indoor clutter runs higher
    #[arg(long, default_value_t = DEFAULT_PATH_LOSS_EXPONENT)]
    pub path_loss: f64,

    /// Expected signal one meter from a transmitter, in dBm
    #[arg(long, default_value_t = DEFAULT_REFERENCE_SIGNAL, allow_negative_numbers = true)]
    pub reference_signal: f64,

    /// Time between rendered frames
    #[arg(long, value_parser = parse_duration, default_value = "100ms")]
    pub frame_interval: Duration,

    /// Fixed seed for the sim backend, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbose logging; shows dropped lines and filter decisions
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Options {
    /// Noise rules derived from the flags.
    pub fn noise_filter(&self) -> NoiseFilter {
        NoiseFilter {
            beacon: (!self.keep_beacons).then_some(worker::BEACON_FRAME),
            floor: Some(self.floor),
        }
    }

    fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            alpha: self.alpha,
            timeout: self.timeout,
            angle_step: registry::DEFAULT_ANGLE_STEP,
        }
    }

    fn distance_scale(&self) -> DistanceScale {
        DistanceScale {
            near_signal: self.near_signal,
            far_signal: self.far_signal,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
        }
    }

    fn path_loss_model(&self) -> PathLossModel {
        PathLossModel {
            exponent: self.path_loss,
            reference_signal: self.reference_signal,
        }
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid calibration: {0}")]
    Calibration(String),
    #[error("feed failed: {0}")]
    Feed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Most recent recognized feed lines, oldest first.
#[derive(Debug, Default)]
struct LogTail {
    lines: VecDeque<String>,
}

impl LogTail {
    fn push(&mut self, line: String) {
        if self.lines.len() == TAIL_PANEL_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn lines(&mut self) -> &[String] {
        self.lines.make_contiguous()
    }
}

/// Fold a bounded batch of pending feed events into the registry.
///
/// Returns the termination once the feed is done. A channel that closes
/// without a terminated event counts as an end of stream.
fn fold_events(
    registry: &DeviceRegistry,
    events: &mut mpsc::Receiver<IngestEvent>,
    now: Instant,
) -> Option<Termination> {
    for _ in 0..FRAME_DRAIN_CAP {
        match events.try_recv() {
            Ok(IngestEvent::Observation(observation)) => registry.upsert(observation, now),
            Ok(IngestEvent::Terminated(termination)) => return Some(termination),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                warn!("feed channel closed without a terminated event");
                return Some(Termination::EndOfStream);
            }
        }
    }
    None
}

/// Run the core frame loop, writing rendered frames to `out` and feed
/// status to `err`.
///
/// - Feed events arrive on `events`; the loop returns when the feed
///   terminates, `Ok` on a clean end of stream and [`RunError::Feed`] when
///   the transport failed. The final state is rendered before returning.
/// - `tail` optionally carries raw recognized lines for the feed panel.
/// - `interactions` optionally carries addresses whose detail rows the
///   display should toggle. The shipped binary passes `None` here; the
///   seam exists for front ends that can deliver input events.
///
/// Identical consecutive frames are rendered once.
pub async fn run_with_io(
    options: Options,
    mut events: mpsc::Receiver<IngestEvent>,
    mut tail: Option<mpsc::Receiver<String>>,
    mut interactions: Option<mpsc::Receiver<MacAddress>>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let scale = options.distance_scale();
    scale.validate().map_err(RunError::Calibration)?;

    let registry = DeviceRegistry::new(
        options.registry_settings(),
        alias::to_map(&options.aliases),
    );
    let formatter = TextFormatter::new(scale, options.path_loss_model());
    write!(out, "{}", formatter.header())?;

    let mut panel = LogTail::default();
    // tokio's interval panics on a zero period
    let period = options.frame_interval.max(Duration::from_millis(1));
    let mut clock = tokio::time::interval(period);
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_frame = String::new();

    loop {
        clock.tick().await;
        let now = Instant::now();

        let outcome = fold_events(&registry, &mut events, now);

        if let Some(rx) = interactions.as_mut() {
            while let Ok(mac) = rx.try_recv() {
                if registry.toggle_detail(&mac).is_none() {
                    warn!("detail toggle for untracked device {mac}");
                }
            }
        }

        if let Some(rx) = tail.as_mut() {
            while let Ok(line) = rx.try_recv() {
                panel.push(line);
            }
        }

        registry.sweep_expired(now);

        let frame = formatter.frame(&registry.snapshot(), panel.lines(), now);
        if frame != last_frame {
            write!(out, "{frame}")?;
            out.flush()?;
            last_frame = frame;
        }

        match outcome {
            Some(Termination::EndOfStream) => {
                writeln!(err, "feed ended")?;
                return Ok(());
            }
            Some(Termination::SourceFailed(reason)) => {
                return Err(RunError::Feed(reason));
            }
            None => {}
        }
    }
}

/// Parse a duration from a human-readable string.
///
/// Supports the following suffixes:
/// - `s` or no suffix: seconds
/// - `m`: minutes
/// - `h`: hours
/// - `ms`: milliseconds
///
/// # Arguments
/// * `src` - A string like "3s", "1m", "500ms", or "30"
///
/// # Returns
/// A Result containing the parsed Duration or an error message.
///
/// # Examples
/// ```
/// use wifi_sentinel::app::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
/// assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// ```
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();

    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    if let Some(num) = src.strip_suffix("ms") {
        let millis: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid milliseconds: {}", num))?;
        return Ok(Duration::from_millis(millis));
    }

    if let Some(num) = src.strip_suffix('h') {
        let hours: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid hours: {}", num))?;
        return Ok(Duration::from_secs(hours * 3600));
    }

    if let Some(num) = src.strip_suffix('m') {
        let minutes: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid minutes: {}", num))?;
        return Ok(Duration::from_secs(minutes * 60));
    }

    if let Some(num) = src.strip_suffix('s') {
        let secs: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid seconds: {}", num))?;
        return Ok(Duration::from_secs(secs));
    }

    // No suffix, treat as seconds
    let secs: u64 = src
        .parse()
        .map_err(|_| format!("invalid duration: {}", src))?;
    Ok(Duration::from_secs(secs))
}
