//! # meshtastic-client
//!
//! An async Rust client library for Meshtastic mesh radios.
//!
//! This library speaks the radio's host protocol over serial or HTTP:
//! sending text, waypoints, position reports and administrative commands,
//! and receiving the stream of application packets the radio produces.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Typed event stream for every decoded packet variant
//! - Per-packet delivery tracking correlated with the radio's routing
//!   acknowledgements
//! - Configuration lockstep handling, including automatic reconfiguration
//!   after a radio reboot
//! - In-band XMODEM file transfer
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshtastic_client::{ChannelIndex, Destination, MeshDevice};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), meshtastic_client::Error> {
//!     // Connect to a radio on a serial port
//!     let mut device = MeshDevice::serial("/dev/ttyUSB0");
//!     device.connect().await?;
//!
//!     // Send a broadcast text message and wait for the mesh ack
//!     let handle = device
//!         .send_text("hello mesh", Destination::Broadcast, ChannelIndex::Primary, true)
//!         .await?;
//!     let packet_id = handle.wait_ack().await?;
//!     println!("delivered as packet {packet_id}");
//!
//!     device.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`proto`] - Protocol-buffers schema types (`ToRadio`, `FromRadio`, ...)
//! - [`protocol`] - Framing, transmit queue and the XMODEM engine
//! - [`types`] - Session data types (status, destinations, packet envelopes)
//! - [`transport`] - Transport implementations (serial, HTTP)
//! - [`event`] - Typed event stream for radio notifications
//! - [`client`] - High-level [`MeshDevice`] session
//! - [`commands`] - Administrative operations on the session

pub mod client;
pub mod commands;
pub mod error;
pub mod event;
pub mod proto;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{MeshDevice, SendOptions, MIN_FIRMWARE_VERSION};
pub use error::{Error, FrameError, Result};
pub use event::{Event, EventDispatcher, Subscription};
pub use protocol::{SendHandle, TxQueue, XmodemEngine, XmodemOutcome};
pub use transport::{
    HttpConfig, HttpTransport, SerialConfig, SerialTransport, Transport, serial::list_ports,
};
pub use types::{ChannelIndex, Destination, DeviceStatus, PacketKind, PacketMetadata};
