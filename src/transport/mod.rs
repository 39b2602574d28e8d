//! Transport layer for radio communication.
//!
//! A transport moves opaque `ToRadio`/`FromRadio` payloads between the host
//! and the radio. Framing is a per-transport concern: the serial link wraps
//! payloads in the length-prefixed wire frame, while the HTTP API carries
//! them as request/response bodies.

pub mod http;
pub mod serial;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::Result;

/// Boxed future used by the object-safe transport methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for transport implementations.
///
/// The session is the only writer; received payloads are pumped through the
/// channel handed out by [`take_frames`](Transport::take_frames).
pub trait Transport: Send + Sync {
    /// Connects to the device.
    fn connect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Disconnects from the device.
    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Sends one message payload to the device.
    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>>;

    /// Checks transport liveness.
    fn ping(&mut self) -> BoxFuture<'_, Result<bool>>;

    /// Hands out the receive side of the inbound payload pump.
    ///
    /// Available once per connect; the session takes it right after
    /// [`connect`](Transport::connect) succeeds.
    fn take_frames(&mut self) -> Option<mpsc::Receiver<Bytes>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

pub use http::{HttpConfig, HttpTransport};
pub use serial::{SerialConfig, SerialTransport, list_ports};
