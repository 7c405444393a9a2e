//! Sniffer feed line parsing.
//!
//! The ESP32 firmware prints one text line per captured frame:
//!
//! ```text
//! FT: 0 FST: 8 SRC: 082697773354 DEST: ffffffffffff RSSI: -62 SEQ: 1 CHNL: 6
//! ```
//!
//! Two extraction strategies cover the firmware revisions in the field.
//! Newer builds reorder or drop fields, so the default strategy anchors on
//! the field labels; the positional strategy pins the original fixed token
//! order for feeds that predate labels being authoritative.

use crate::mac_address::{MacAddress, ParseMacError};
use std::str::FromStr;
use thiserror::Error;

/// Every feed line describing a captured frame starts with this marker.
/// Anything else is boot chatter or line noise.
pub const FRAME_MARKER: &str = "FT:";

/// Token count of the shortest complete fixed-order line
/// (`FT: <n> FST: <n> SRC: <mac> DEST: <mac> RSSI: <n>`).
const POSITIONAL_MIN_TOKENS: usize = 10;

/// Fields extracted from one feed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// 802.11 frame type, when the line carries one
    pub frame_type: Option<u8>,
    /// 802.11 frame subtype, when the line carries one
    pub subtype: Option<u8>,
    /// Transmitter address
    pub mac: MacAddress,
    /// Received signal strength in dBm
    pub rssi: i32,
}

/// Errors returned when a frame line cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Line lacks the frame marker entirely
    #[error("not a frame line")]
    NotAFrame,
    /// Fixed-order layout needs the full token count
    #[error("frame line too short: {0} tokens")]
    TooShort(usize),
    /// A required labelled field is absent or has no value token
    #[error("missing field {0}")]
    MissingField(&'static str),
    /// Transmitter address token is not a MAC address
    #[error("bad transmitter address: {0}")]
    BadMac(#[from] ParseMacError),
    /// RSSI token is not a signed integer
    #[error("bad RSSI value '{0}'")]
    BadRssi(String),
    /// Frame type or subtype token is not a small integer
    #[error("bad frame type value '{0}'")]
    BadFrameType(String),
}

/// How field values are located within a frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ParseStrategy {
    /// Scan for field labels; tolerates reordered and omitted fields
    #[default]
    Labelled,
    /// Fixed token offsets matching the original firmware field order
    Positional,
}

impl std::fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStrategy::Labelled => write!(f, "labelled"),
            ParseStrategy::Positional => write!(f, "positional"),
        }
    }
}

/// Decode one feed line into a [`FrameReport`].
///
/// The line is trimmed first; serial feeds end lines with `\r\n`.
///
/// # Arguments
/// * `line` - One line of feed text, without the trailing newline
/// * `strategy` - Field extraction strategy
///
/// # Returns
/// The extracted report, or a [`ParseError`] naming what disqualified
/// the line.
pub fn parse_line(line: &str, strategy: ParseStrategy) -> Result<FrameReport, ParseError> {
    let line = line.trim();
    if !line.starts_with(FRAME_MARKER) {
        return Err(ParseError::NotAFrame);
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    match strategy {
        ParseStrategy::Labelled => parse_labelled(&tokens),
        ParseStrategy::Positional => parse_positional(&tokens),
    }
}

/// Value token following `label`, if both are present.
fn labelled_value<'a>(tokens: &[&'a str], label: &str) -> Option<&'a str> {
    tokens
        .iter()
        .position(|token| *token == label)
        .and_then(|at| tokens.get(at + 1))
        .copied()
}

fn parse_labelled(tokens: &[&str]) -> Result<FrameReport, ParseError> {
    let mac = labelled_value(tokens, "SRC:").ok_or(ParseError::MissingField("SRC:"))?;
    let rssi = labelled_value(tokens, "RSSI:").ok_or(ParseError::MissingField("RSSI:"))?;
    let frame_type = labelled_value(tokens, "FT:").map(parse_type_field).transpose()?;
    let subtype = labelled_value(tokens, "FST:").map(parse_type_field).transpose()?;

    Ok(FrameReport {
        frame_type,
        subtype,
        mac: MacAddress::from_str(mac)?,
        rssi: parse_rssi(rssi)?,
    })
}

fn parse_positional(tokens: &[&str]) -> Result<FrameReport, ParseError> {
    if tokens.len() < POSITIONAL_MIN_TOKENS {
        return Err(ParseError::TooShort(tokens.len()));
    }

    Ok(FrameReport {
        frame_type: Some(parse_type_field(tokens[1])?),
        subtype: Some(parse_type_field(tokens[3])?),
        mac: MacAddress::from_str(tokens[5])?,
        rssi: parse_rssi(tokens[9])?,
    })
}

fn parse_type_field(token: &str) -> Result<u8, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::BadFrameType(token.to_string()))
}

fn parse_rssi(token: &str) -> Result<i32, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::BadRssi(token.to_string()))
}
