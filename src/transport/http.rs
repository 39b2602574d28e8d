//! HTTP transport implementation.
//!
//! Radios with WiFi or Ethernet expose the same message stream over a small
//! HTTP API: `PUT /api/v1/toradio` accepts a raw `ToRadio` payload and
//! `GET /api/v1/fromradio` long-polls for the next `FromRadio` payload. No
//! length-prefixed framing applies here; bodies are bare protobuf.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::transport::{BoxFuture, Transport};

/// Default delay between fromradio polls when the radio has no data.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_millis(750);

/// Configuration for HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host name or address of the radio (e.g., "meshtastic.local").
    pub address: String,
    /// Use https instead of http.
    pub tls: bool,
    /// Poll delay while the radio reports no pending data.
    pub fetch_interval: Duration,
}

impl HttpConfig {
    /// Creates a new HTTP configuration with default settings.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            tls: false,
            fetch_interval: DEFAULT_FETCH_INTERVAL,
        }
    }

    /// Enables or disables TLS.
    #[must_use]
    pub const fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Sets the poll delay.
    #[must_use]
    pub const fn fetch_interval(mut self, interval: Duration) -> Self {
        self.fetch_interval = interval;
        self
    }

    fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{scheme}://{}", self.address)
    }
}

/// HTTP transport for network-attached radios.
pub struct HttpTransport {
    config: HttpConfig,
    client: reqwest::Client,
    connected: bool,
    poll_task: Option<JoinHandle<()>>,
    frame_rx: Option<mpsc::Receiver<Bytes>>,
}

impl HttpTransport {
    /// Creates a new HTTP transport with the given configuration.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            connected: false,
            poll_task: None,
            frame_rx: None,
        }
    }

    /// Creates a new HTTP transport for the given address with default
    /// settings.
    #[must_use]
    pub fn with_address(address: impl Into<String>) -> Self {
        Self::new(HttpConfig::new(address))
    }

    /// Polls the fromradio endpoint, pumping non-empty payloads out.
    async fn run_poll_loop(
        client: reqwest::Client,
        base_url: String,
        fetch_interval: Duration,
        frame_tx: mpsc::Sender<Bytes>,
    ) {
        let url = format!("{base_url}/api/v1/fromradio?all=false");

        loop {
            match client.get(&url).send().await {
                Ok(response) => match response.bytes().await {
                    Ok(body) if !body.is_empty() => {
                        tracing::trace!("fromradio payload: {} bytes", body.len());
                        if frame_tx.send(body).await.is_err() {
                            // Session is gone; stop polling.
                            return;
                        }
                        // More data may be pending; poll again immediately.
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("fromradio body error: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("fromradio poll error: {}", e);
                }
            }
            tokio::time::sleep(fetch_interval).await;
        }
    }
}

impl Transport for HttpTransport {
    fn connect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.connected {
                return Ok(());
            }

            let base_url = self.config.base_url();
            tracing::info!("connecting to radio at {base_url}");

            // Probe the API before declaring the link up.
            self.client
                .get(format!("{base_url}/hotspot-detect.html"))
                .send()
                .await
                .map_err(Error::Http)?;

            let (frame_tx, frame_rx) = mpsc::channel(256);
            self.frame_rx = Some(frame_rx);
            self.poll_task = Some(tokio::spawn(Self::run_poll_loop(
                self.client.clone(),
                base_url,
                self.config.fetch_interval,
                frame_tx,
            )));
            self.connected = true;

            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(task) = self.poll_task.take() {
                task.abort();
            }
            self.frame_rx = None;
            self.connected = false;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>> {
        let url = format!("{}/api/v1/toradio", self.config.base_url());
        let client = self.client.clone();
        let connected = self.connected;
        Box::pin(async move {
            if !connected {
                return Err(Error::NotConnected);
            }

            tracing::trace!("posting toradio payload: {} bytes", data.len());
            client
                .put(&url)
                .header("Content-Type", "application/x-protobuf")
                .body(data)
                .send()
                .await
                .map_err(Error::Http)?
                .error_for_status()
                .map_err(Error::Http)?;

            Ok(())
        })
    }

    fn ping(&mut self) -> BoxFuture<'_, Result<bool>> {
        let url = format!("{}/hotspot-detect.html", self.config.base_url());
        let client = self.client.clone();
        Box::pin(async move {
            match client.get(&url).send().await {
                Ok(response) => Ok(response.status().is_success()),
                Err(_) => Ok(false),
            }
        })
    }

    fn take_frames(&mut self) -> Option<mpsc::Receiver<Bytes>> {
        self.frame_rx.take()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::new("meshtastic.local");
        assert_eq!(config.address, "meshtastic.local");
        assert!(!config.tls);
        assert_eq!(config.base_url(), "http://meshtastic.local");
    }

    #[test]
    fn test_http_config_tls_url() {
        let config = HttpConfig::new("192.168.1.20").tls(true);
        assert_eq!(config.base_url(), "https://192.168.1.20");
    }
}
