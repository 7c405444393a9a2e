//! Recorded feed backend.
//!
//! Replays a capture of sniffer output from a file, or from stdin when the
//! path is `-`. Useful for reproducing field reports and for piping the
//! feed through ssh from a machine that has the hardware.

use super::{LineSource, SourceError, read_line_lossy};
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};

/// Path value that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Feed source reading a recorded capture.
pub struct ReplaySource {
    path: String,
    reader: Option<BufReader<Box<dyn AsyncRead + Send + Unpin>>>,
    buf: Vec<u8>,
}

impl ReplaySource {
    /// Create a source for the given capture path, or stdin for `-`.
    pub fn new(path: &str) -> Self {
        ReplaySource {
            path: path.to_string(),
            reader: None,
            buf: Vec::new(),
        }
    }

    fn reads_stdin(&self) -> bool {
        self.path == STDIN_PATH
    }
}

#[async_trait]
impl LineSource for ReplaySource {
    async fn connect(&mut self) -> Result<(), SourceError> {
        let inner: Box<dyn AsyncRead + Send + Unpin> = if self.reads_stdin() {
            Box::new(tokio::io::stdin())
        } else {
            Box::new(File::open(&self.path).await?)
        };

        self.reader = Some(BufReader::new(inner));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        let reader = self.reader.as_mut().ok_or(SourceError::NotConnected)?;
        Ok(read_line_lossy(reader, &mut self.buf).await?)
    }

    fn describe(&self) -> String {
        if self.reads_stdin() {
            "replay from stdin".to_string()
        } else {
            format!("replay of {}", self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_replays_file_lines() {
        let mut capture = tempfile::NamedTempFile::new().unwrap();
        writeln!(capture, "FT: 0 FST: 8 SRC: aabbccddeeff DEST: ffffffffffff RSSI: -62 SEQ: 1 CHNL: 6").unwrap();
        writeln!(capture, "FT: 2 FST: 0 SRC: a0cc2b775e0a RSSI: -48").unwrap();
        capture.flush().unwrap();

        let mut source = ReplaySource::new(capture.path().to_str().unwrap());
        source.connect().await.unwrap();

        let first = source.next_line().await.unwrap().unwrap();
        assert!(first.starts_with("FT: 0"));
        let second = source.next_line().await.unwrap().unwrap();
        assert!(second.contains("a0cc2b775e0a"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_fails_on_connect() {
        let mut source = ReplaySource::new("/nonexistent/capture.log");
        assert!(matches!(
            source.connect().await,
            Err(SourceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced_not_fatal() {
        let mut capture = tempfile::NamedTempFile::new().unwrap();
        capture.as_file_mut().write_all(b"FT: 0 \xff garbage\nFT: 2 FST: 0 SRC: aabbccddeeff RSSI: -40\n").unwrap();
        capture.flush().unwrap();

        let mut source = ReplaySource::new(capture.path().to_str().unwrap());
        source.connect().await.unwrap();

        let mangled = source.next_line().await.unwrap().unwrap();
        assert!(mangled.contains('\u{FFFD}'));
        // The stream keeps going after the mangled line
        let clean = source.next_line().await.unwrap().unwrap();
        assert!(clean.contains("aabbccddeeff"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(ReplaySource::new("-").describe(), "replay from stdin");
        assert_eq!(
            ReplaySource::new("feed.log").describe(),
            "replay of feed.log"
        );
    }
}
