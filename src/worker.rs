//! Feed ingestion worker.
//!
//! One spawned task owns the line source: it connects, reads lines, parses
//! them, filters noise, and hands accepted observations to the consumer
//! over a bounded channel. When the source ends or fails, the worker sends
//! a tagged terminated event and exits; termination is a distinct variant,
//! never an in-band value that could collide with data.
//!
//! Recognized frame lines are also mirrored, truncated, onto an optional
//! diagnostic tail channel so the display can show raw traffic. The tail is
//! best effort: when it backs up, lines are dropped rather than stalling
//! ingestion.

use crate::frame::{self, FrameReport, ParseError, ParseStrategy};
use crate::observation::Observation;
use crate::source::LineSource;
use log::{debug, info, trace, warn};
use tokio::sync::mpsc;

/// Channel buffer size for ingest events.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Channel buffer size for the diagnostic tail.
pub const TAIL_CHANNEL_CAPACITY: usize = 64;

/// Width tail lines are cut to before forwarding.
pub const TAIL_LINE_WIDTH: usize = 80;

/// Frame type/subtype pair of access point beacons.
pub const BEACON_FRAME: (u8, u8) = (0, 8);

/// Readings strictly below this level are indistinguishable from noise.
pub const DEFAULT_SIGNAL_FLOOR: i32 = -95;

/// One message from the ingestion worker.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    /// An accepted device sighting
    Observation(Observation),
    /// The worker stopped; nothing follows this event
    Terminated(Termination),
}

/// Why the worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The feed ran out, e.g. a replay reached end of file
    EndOfStream,
    /// The transport failed to connect or read
    SourceFailed(String),
}

/// Why the filter dropped a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Matched the beacon type/subtype pair
    Beacon,
    /// Reading strictly below the noise floor
    BelowFloor,
}

/// Frame filter applied between parsing and the hand-off channel.
///
/// Both rules are optional. `beacon` drops the access point's periodic
/// beacons, which would otherwise dominate the registry with one very loud
/// device; `floor` drops readings too weak to mean presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseFilter {
    /// Frame type/subtype pair to drop
    pub beacon: Option<(u8, u8)>,
    /// Drop readings strictly below this dBm level
    pub floor: Option<i32>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        NoiseFilter {
            beacon: Some(BEACON_FRAME),
            floor: Some(DEFAULT_SIGNAL_FLOOR),
        }
    }
}

impl NoiseFilter {
    /// A filter that passes everything.
    pub fn permissive() -> Self {
        NoiseFilter {
            beacon: None,
            floor: None,
        }
    }

    /// First rule that rejects the report, `None` if it passes.
    ///
    /// The beacon rule only fires when the report carries both type and
    /// subtype; a line that omits them cannot be identified as a beacon.
    pub fn check(&self, report: &FrameReport) -> Option<Rejection> {
        if let Some((frame_type, subtype)) = self.beacon
            && report.frame_type == Some(frame_type)
            && report.subtype == Some(subtype)
        {
            return Some(Rejection::Beacon);
        }

        if let Some(floor) = self.floor
            && report.rssi < floor
        {
            return Some(Rejection::BelowFloor);
        }

        None
    }
}

/// Spawn the ingestion worker for `source`.
///
/// The worker connects inside the task, so transport failures surface as a
/// [`Termination::SourceFailed`] event rather than an early return.
///
/// # Arguments
/// * `source` - Feed transport, not yet connected
/// * `strategy` - Field extraction strategy for frame lines
/// * `filter` - Noise rules applied to parsed frames
/// * `tail` - Optional channel mirroring recognized raw lines
///
/// # Returns
/// The receiving side of the event channel. The final event is always
/// [`IngestEvent::Terminated`] unless the receiver hangs up first.
pub fn spawn(
    mut source: Box<dyn LineSource>,
    strategy: ParseStrategy,
    filter: NoiseFilter,
    tail: Option<mpsc::Sender<String>>,
) -> mpsc::Receiver<IngestEvent> {
    let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        info!("connecting to {}", source.describe());
        if let Err(e) = source.connect().await {
            warn!("connect failed: {e}");
            let terminated = IngestEvent::Terminated(Termination::SourceFailed(e.to_string()));
            let _ = events.send(terminated).await;
            return;
        }
        info!("streaming from {} ({strategy} fields)", source.describe());

        loop {
            match source.next_line().await {
                Ok(Some(line)) => {
                    if !process_line(&line, strategy, &filter, &events, tail.as_ref()).await {
                        debug!("consumer hung up, stopping worker");
                        return;
                    }
                }
                Ok(None) => {
                    info!("feed ended");
                    let terminated = IngestEvent::Terminated(Termination::EndOfStream);
                    let _ = events.send(terminated).await;
                    return;
                }
                Err(e) => {
                    warn!("feed failed: {e}");
                    let terminated =
                        IngestEvent::Terminated(Termination::SourceFailed(e.to_string()));
                    let _ = events.send(terminated).await;
                    return;
                }
            }
        }
    });

    receiver
}

/// Handle one feed line. Returns `false` when the consumer is gone.
async fn process_line(
    line: &str,
    strategy: ParseStrategy,
    filter: &NoiseFilter,
    events: &mpsc::Sender<IngestEvent>,
    tail: Option<&mpsc::Sender<String>>,
) -> bool {
    let report = match frame::parse_line(line, strategy) {
        Ok(report) => report,
        Err(ParseError::NotAFrame) => {
            trace!("skipping chatter: {line}");
            return true;
        }
        Err(e) => {
            debug!("malformed frame line ({e}): {line}");
            return true;
        }
    };

    if let Some(tail) = tail {
        let _ = tail.try_send(truncate_line(line));
    }

    if let Some(rejection) = filter.check(&report) {
        trace!("dropped {:?} frame from {}", rejection, report.mac);
        return true;
    }

    let observation = Observation {
        mac: report.mac,
        rssi: report.rssi,
    };
    events.send(IngestEvent::Observation(observation)).await.is_ok()
}

fn truncate_line(line: &str) -> String {
    line.trim().chars().take(TAIL_LINE_WIDTH).collect()
}
