//! Serial/USB transport implementation.
//!
//! Radios attached over USB expose the framed protocol stream on a serial
//! console. Writes are wrapped in the length-prefixed wire frame; a
//! background task owns the read half and pumps decoded payloads to the
//! session.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::error::{Error, Result};
use crate::protocol::{encode_frame, FrameDecoder};
use crate::transport::{BoxFuture, Transport};

/// Default baud rate for the radio's serial console.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default settle time between opening the port and the first frame.
pub const DEFAULT_CONNECTION_DELAY: Duration = Duration::from_millis(300);

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Settle time after opening before traffic starts.
    pub connection_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            connection_delay: DEFAULT_CONNECTION_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the settle time.
    #[must_use]
    pub const fn connection_delay(mut self, delay: Duration) -> Self {
        self.connection_delay = delay;
        self
    }
}

/// Serial transport using split read/write halves so reading and writing
/// proceed concurrently.
pub struct SerialTransport {
    config: SerialConfig,
    writer: Option<Arc<Mutex<WriteHalf<SerialStream>>>>,
    read_task: Option<JoinHandle<()>>,
    frame_rx: Option<mpsc::Receiver<Bytes>>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            writer: None,
            read_task: None,
            frame_rx: None,
        }
    }

    /// Creates a new serial transport for the given port with default
    /// settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }
}

/// Owns the read half: accumulates raw bytes and forwards each framed
/// payload to the session.
///
/// Ends when the port goes away or the session drops its receiver; either
/// way the closed channel tells the session the link is dead.
async fn pump(mut reader: ReadHalf<SerialStream>, frames: mpsc::Sender<Bytes>) {
    let mut decoder = FrameDecoder::new();
    let mut chunk = [0u8; 512];

    loop {
        let len = match reader.read(&mut chunk).await {
            Ok(0) => {
                tracing::debug!("serial link closed by peer");
                return;
            }
            Ok(len) => len,
            Err(e) => {
                tracing::error!("serial read failed: {e}");
                return;
            }
        };

        decoder.feed(&chunk[..len]);
        loop {
            match decoder.decode() {
                Ok(Some(payload)) => {
                    if frames.send(payload).await.is_err() {
                        // Session is gone; nothing left to deliver to.
                        return;
                    }
                }
                Ok(None) => break,
                // The decoder rescans for the next magic pair on its own.
                Err(e) => tracing::warn!("bad frame on serial link: {e}"),
            }
        }
    }
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.writer.is_some() {
                return Ok(());
            }

            let SerialConfig {
                port,
                baud_rate,
                connection_delay,
            } = self.config.clone();

            tracing::info!("opening {port} at {baud_rate} baud");
            let mut stream = tokio_serial::new(&port, baud_rate)
                .open_native_async()
                .map_err(Error::Serial)?;

            // RTS low: several boards wire it to reset and would reboot
            // the moment the port opens.
            if let Err(e) = tokio_serial::SerialPort::write_request_to_send(&mut stream, false) {
                tracing::warn!("could not clear RTS on {port}: {e}");
            }

            // Give the firmware a moment before the first frame goes out.
            tokio::time::sleep(connection_delay).await;

            let (reader, writer) = tokio::io::split(stream);
            let (frame_tx, frame_rx) = mpsc::channel(256);
            self.read_task = Some(tokio::spawn(pump(reader, frame_tx)));
            self.frame_rx = Some(frame_rx);
            self.writer = Some(Arc::new(Mutex::new(writer)));

            tracing::debug!("serial link ready");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(task) = self.read_task.take() {
                task.abort();
            }
            if self.writer.take().is_some() {
                tracing::info!("closed {}", self.config.port);
            }
            self.frame_rx = None;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>> {
        let writer = self.writer.clone();
        Box::pin(async move {
            let writer = writer.ok_or(Error::NotConnected)?;

            let frame = encode_frame(&data)?;
            tracing::trace!("tx {} payload bytes ({} framed)", data.len(), frame.len());
            if tracing::enabled!(tracing::Level::TRACE) {
                tracing::trace!("tx payload hex: {}", hex::encode(&data));
            }

            let mut port = writer.lock().await;
            port.write_all(&frame).await?;
            port.flush().await?;
            Ok(())
        })
    }

    fn ping(&mut self) -> BoxFuture<'_, Result<bool>> {
        let alive = self.writer.is_some();
        Box::pin(async move { Ok(alive) })
    }

    fn take_frames(&mut self) -> Option<mpsc::Receiver<Bytes>> {
        self.frame_rx.take()
    }

    fn is_connected(&self) -> bool {
        self.writer.is_some()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
    }
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(Error::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.connection_delay, DEFAULT_CONNECTION_DELAY);
    }

    #[test]
    fn test_config_overrides() {
        let config = SerialConfig::new("COM7")
            .baud_rate(921_600)
            .connection_delay(Duration::from_millis(50));
        assert_eq!(config.port, "COM7");
        assert_eq!(config.baud_rate, 921_600);
        assert_eq!(config.connection_delay, Duration::from_millis(50));
    }

    #[test]
    #[ignore = "Requires /sys/class/tty - not available in sandboxed builds"]
    fn test_list_ports() {
        // Just verify it doesn't panic
        let _ = list_ports();
    }
}
