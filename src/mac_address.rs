//! Efficient MAC address type for sniffed WiFi devices.
//!
//! This module provides a compact 6-byte MAC address representation that is
//! decoupled from any specific capture backend. Addresses render in the
//! sniffer's native form (12 lower-case hex digits, no separators) so they
//! can be compared textually against raw feed lines.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// A WiFi MAC address stored as a compact 6-byte array.
///
/// This type provides efficient storage and hashing for use as map keys.
/// The `Ord` implementation orders addresses byte-wise, which gives
/// registry snapshots a stable, deterministic device order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Returns the vendor (OUI) prefix, the first three bytes.
    pub fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Returns the last four hex digits, used when labelling devices that
    /// have no configured name without exposing the full address.
    pub fn short_suffix(&self) -> String {
        format!("{:02x}{:02x}", self.0[4], self.0[5])
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Errors returned when parsing a MAC address string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseMacError {
    #[error("invalid MAC address: expected 12 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid MAC address: '{0}' is not valid hex")]
    InvalidHex(String),
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Accepts colon-separated (`aa:bb:cc:dd:ee:ff`), dash-separated and
    /// bare (`aabbccddeeff`) forms, in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<char> = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 {
            return Err(ParseMacError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            // Pair up characters, not byte offsets; lossily decoded feed
            // garbage can put multi-byte characters in the token
            let pair: String = digits[i * 2..i * 2 + 2].iter().collect();
            *byte = u8::from_str_radix(&pair, 16)
                .map_err(|_| ParseMacError::InvalidHex(pair))?;
        }

        Ok(MacAddress(bytes))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}
