//! Serial port feed backend.
//!
//! Reads sniffer output straight from the ESP32's USB-serial adapter. The
//! firmware prints at 115200 baud, 8N1.

use super::{LineSource, SourceError, read_line_lossy};
use async_trait::async_trait;
use tokio::io::BufReader;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Feed source reading from a serial port.
pub struct SerialSource {
    path: String,
    baud: u32,
    reader: Option<BufReader<SerialStream>>,
    buf: Vec<u8>,
}

impl SerialSource {
    /// Create a source for the given device path, e.g. `/dev/ttyUSB0`.
    /// The port is not opened until [`LineSource::connect`].
    pub fn new(path: &str, baud: u32) -> Self {
        SerialSource {
            path: path.to_string(),
            baud,
            reader: None,
            buf: Vec::new(),
        }
    }
}

#[async_trait]
impl LineSource for SerialSource {
    async fn connect(&mut self) -> Result<(), SourceError> {
        let stream = tokio_serial::new(&self.path, self.baud)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()?;

        self.reader = Some(BufReader::new(stream));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        let reader = self.reader.as_mut().ok_or(SourceError::NotConnected)?;
        Ok(read_line_lossy(reader, &mut self.buf).await?)
    }

    fn describe(&self) -> String {
        format!("serial port {} at {} baud", self.path, self.baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_before_connect() {
        let mut source = SerialSource::new("/dev/ttyUSB0", crate::source::DEFAULT_BAUD);
        assert!(matches!(
            source.next_line().await,
            Err(SourceError::NotConnected)
        ));
    }

    #[test]
    fn test_describe_names_port() {
        let source = SerialSource::new("/dev/ttyACM1", 9600);
        assert_eq!(source.describe(), "serial port /dev/ttyACM1 at 9600 baud");
    }
}
