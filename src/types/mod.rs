//! Core data types shared across the session, queue and event layers.

use crate::error::{Error, Result};
use crate::proto::BROADCAST_ADDR;

/// Connection and configuration lifecycle of a radio session.
///
/// Driven by transport callbacks and by configuration messages received
/// from the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    /// No transport link.
    #[default]
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// Transport link up, configuration not yet requested.
    Connected,
    /// Waiting for the radio's configuration push to complete.
    Configuring,
    /// Configuration push complete; session fully usable.
    Configured,
    /// Transport lost, reconnect in progress.
    Reconnecting,
    /// Orderly shutdown in progress.
    Disconnecting,
    /// Radio switched into firmware-update (DFU) mode.
    FirmwareUpdate,
    /// Radio is rebooting or shutting down on our request.
    Restarting,
}

/// Where an outbound packet is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// All reachable nodes on the channel (0xFFFFFFFF).
    Broadcast,
    /// The radio this session is attached to; substituted with the stored
    /// my-node number at send time.
    Local,
    /// A specific node by node number.
    Node(u32),
}

impl Destination {
    /// Resolves the destination to a wire address.
    ///
    /// # Errors
    ///
    /// Returns an error for [`Destination::Local`] before the radio has
    /// reported its node number.
    pub fn resolve(self, my_node_num: Option<u32>) -> Result<u32> {
        match self {
            Self::Broadcast => Ok(BROADCAST_ADDR),
            Self::Node(num) => Ok(num),
            Self::Local => my_node_num.ok_or_else(|| Error::Protocol {
                message: "local node number not yet known (no myInfo received)".into(),
            }),
        }
    }
}

/// Channel slot index. The radio supports eight slots; the last one is
/// reserved for admin traffic to remote nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ChannelIndex {
    #[default]
    Primary = 0,
    Channel1 = 1,
    Channel2 = 2,
    Channel3 = 3,
    Channel4 = 4,
    Channel5 = 5,
    Channel6 = 6,
    /// Out-of-primary admin traffic to remote nodes.
    Admin = 7,
}

impl From<ChannelIndex> for u32 {
    fn from(index: ChannelIndex) -> Self {
        index as Self
    }
}

/// Whether an inbound packet was addressed to everyone or to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Broadcast,
    Direct,
}

/// Common envelope attached to every inbound application event.
#[derive(Debug, Clone)]
pub struct PacketMetadata<T> {
    /// Mesh packet id.
    pub id: u32,
    /// Receive timestamp, seconds since the Unix epoch.
    pub rx_time: u32,
    /// Sending node number.
    pub from: u32,
    /// Destination address.
    pub to: u32,
    /// Channel slot the packet arrived on.
    pub channel: u32,
    /// Broadcast or direct.
    pub kind: PacketKind,
    /// Decoded payload.
    pub data: T,
}
