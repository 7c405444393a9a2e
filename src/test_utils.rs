use crate::mac_address::MacAddress;
use crate::observation::Observation;
use crate::source::{LineSource, SourceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;

/// A stable MAC address for unit tests.
pub const TEST_MAC: MacAddress = MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// Build an observation from an address literal.
pub fn observation(mac: &str, rssi: i32) -> Observation {
    Observation {
        mac: mac.parse().unwrap(),
        rssi,
    }
}

/// Line source that plays back a scripted set of lines.
///
/// When the script runs out it reports end of stream, or a read failure
/// when `fail_after` is set. The connect call can be scripted to fail too.
pub struct ScriptedSource {
    lines: VecDeque<String>,
    pub fail_connect: Option<String>,
    pub fail_after: Option<String>,
}

impl ScriptedSource {
    pub fn with_lines(lines: &[&str]) -> Self {
        ScriptedSource {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            fail_connect: None,
            fail_after: None,
        }
    }

    pub fn failing_connect(message: &str) -> Self {
        ScriptedSource {
            lines: VecDeque::new(),
            fail_connect: Some(message.to_string()),
            fail_after: None,
        }
    }
}

#[async_trait]
impl LineSource for ScriptedSource {
    async fn connect(&mut self) -> Result<(), SourceError> {
        match self.fail_connect.take() {
            Some(message) => Err(SourceError::Io(io::Error::other(message))),
            None => Ok(()),
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        match self.fail_after.take() {
            Some(message) => Err(SourceError::Io(io::Error::other(message))),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        "scripted feed".to_string()
    }
}
