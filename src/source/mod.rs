//! Feed sources for sniffer output.
//!
//! This module provides a trait-based abstraction over the transports a
//! sniffer feed can arrive on: a live serial port, a recorded file (or
//! stdin), and a synthetic generator for running without hardware.
//!
//! Sources deal in text lines. Sniffer firmware occasionally emits bytes
//! that are not valid UTF-8 (boot banners, line garbage after a reset), so
//! lines are decoded lossily; a mangled line must never look like a
//! transport failure.

pub mod replay;
#[cfg(feature = "serial")]
pub mod serial;
pub mod sim;

/// Device path the sniffer usually enumerates at.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Line rate the sniffer firmware ships with.
pub const DEFAULT_BAUD: u32 = 115_200;

use async_trait::async_trait;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Error type for feed transport failures.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Serial port could not be opened or configured
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    /// Underlying read failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// `next_line` called before `connect`
    #[error("source used before connect")]
    NotConnected,
}

/// A feed transport delivering sniffer output one line at a time.
///
/// `connect` establishes the transport and may be retried by the caller
/// after a failure. `next_line` returns `Ok(None)` when the feed is
/// exhausted; live transports never are.
#[async_trait]
pub trait LineSource: Send {
    /// Establish the underlying transport.
    async fn connect(&mut self) -> Result<(), SourceError>;

    /// Next line of feed text, without its line terminator.
    async fn next_line(&mut self) -> Result<Option<String>, SourceError>;

    /// Human-readable transport description for logs.
    fn describe(&self) -> String;
}

/// Available feed backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// ESP32 sniffer attached to a serial port
    #[cfg(feature = "serial")]
    Serial,
    /// Recorded feed from a file, or stdin when the path is "-"
    Replay,
    /// Synthetic sniffer traffic, no hardware required
    Sim,
}

impl Default for Backend {
    fn default() -> Self {
        #[cfg(feature = "serial")]
        return Backend::Serial;
        #[cfg(not(feature = "serial"))]
        return Backend::Sim;
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "serial")]
            Backend::Serial => write!(f, "serial"),
            Backend::Replay => write!(f, "replay"),
            Backend::Sim => write!(f, "sim"),
        }
    }
}

/// Read one line from `reader`, replacing undecodable bytes.
///
/// Returns `Ok(None)` at end of stream. Trailing `\n` and `\r` are
/// stripped. `buf` is scratch space reused across calls.
pub(crate) async fn read_line_lossy<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    let mut line = String::from_utf8_lossy(buf).into_owned();
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}
