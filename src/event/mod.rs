//! Typed event system for radio notifications.
//!
//! Every decoded packet variant and lifecycle change is published on a
//! broadcast channel as a typed [`Event`]. Delivery is best-effort: events
//! dispatched while no subscriber is attached are dropped.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::proto;
use crate::types::{DeviceStatus, PacketMetadata};

/// Event types that can be dispatched.
#[derive(Debug, Clone)]
pub enum Event {
    /// Session lifecycle state changed.
    DeviceStatus(DeviceStatus),
    /// Raw radio-to-host message, dispatched before variant handling.
    FromRadio(Box<proto::FromRadio>),
    /// Raw mesh packet, dispatched before any typed-port event.
    MeshPacket(Box<proto::MeshPacket>),
    /// A packet from another node was heard (timestamp, Unix seconds).
    MeshHeartbeat(u32),
    /// The radio reported its self-identification.
    MyNodeInfo(proto::MyNodeInfo),
    /// Node database entry received.
    NodeInfo(Box<proto::NodeInfo>),
    /// Channel slot received.
    Channel(Box<proto::Channel>),
    /// Configuration section received.
    Config(Box<proto::Config>),
    /// Module configuration section received.
    ModuleConfig(Box<proto::ModuleConfig>),
    /// Owner identity received (admin response).
    Owner(Box<proto::User>),
    /// Firmware log line forwarded by the radio.
    LogRecord(Box<proto::LogRecord>),
    /// Radio transmit queue status changed.
    QueueStatus(proto::QueueStatus),
    /// Firmware and capability description received.
    DeviceMetadata(Box<proto::DeviceMetadata>),
    /// Uncommitted settings changes began or were committed.
    PendingSettingsChanged(bool),
    /// An in-band XMODEM download finished.
    XmodemReceived(Vec<u8>),

    // Typed per-port packet events.
    /// Text message.
    Message(PacketMetadata<String>),
    /// Position report.
    Position(PacketMetadata<proto::Position>),
    /// Node owner broadcast.
    User(PacketMetadata<proto::User>),
    /// Shared waypoint.
    Waypoint(PacketMetadata<proto::Waypoint>),
    /// Telemetry sample.
    Telemetry(PacketMetadata<proto::Telemetry>),
    /// Traceroute reply.
    Traceroute(PacketMetadata<proto::RouteDiscovery>),
    /// Neighbour table broadcast.
    NeighborInfo(PacketMetadata<proto::NeighborInfo>),
    /// People counter report.
    Paxcount(PacketMetadata<proto::Paxcount>),
    /// Routing control packet (acks and delivery errors).
    Routing(PacketMetadata<proto::Routing>),
    /// Remote GPIO message.
    RemoteHardware(PacketMetadata<proto::HardwareMessage>),

    // Ports carried as raw bytes.
    /// Codec2 voice payload.
    Audio(PacketMetadata<Vec<u8>>),
    /// Detection sensor trigger.
    DetectionSensor(PacketMetadata<Vec<u8>>),
    /// Tunnelled IP payload.
    IpTunnel(PacketMetadata<Vec<u8>>),
    /// Serial module payload.
    Serial(PacketMetadata<Vec<u8>>),
    /// Store-and-forward payload.
    StoreForward(PacketMetadata<Vec<u8>>),
    /// Range test payload.
    RangeTest(PacketMetadata<Vec<u8>>),
    /// ZPS payload.
    Zps(PacketMetadata<Vec<u8>>),
    /// Simulator payload.
    Simulator(PacketMetadata<Vec<u8>>),
    /// ATAK plugin payload.
    Atak(PacketMetadata<Vec<u8>>),
    /// Map report payload.
    MapReport(PacketMetadata<Vec<u8>>),
    /// Private application payload.
    Private(PacketMetadata<Vec<u8>>),
    /// ATAK forwarder payload.
    AtakForwarder(PacketMetadata<Vec<u8>>),
    /// Reply (ping) payload.
    Reply(PacketMetadata<Vec<u8>>),
}

/// A subscription to events.
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receives the next event.
    ///
    /// Returns `None` once the dispatcher is gone. A lagged subscriber
    /// skips the missed events and keeps receiving.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("subscriber lagged, skipped {missed} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

struct EventDispatcherInner {
    sender: broadcast::Sender<Event>,
}

/// Dispatches events to subscribers.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<EventDispatcherInner>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventDispatcherInner { sender }),
        }
    }

    /// Dispatches an event to all current subscribers.
    ///
    /// Events with no subscriber attached are dropped.
    pub fn dispatch(&self, event: Event) {
        let _ = self.inner.sender.send(event);
    }

    /// Subscribes to all subsequent events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.inner.sender.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_dispatch() {
        let dispatcher = EventDispatcher::new(16);
        let mut sub = dispatcher.subscribe();

        dispatcher.dispatch(Event::DeviceStatus(DeviceStatus::Connected));

        let event = tokio::time::timeout(std::time::Duration::from_millis(100), sub.recv())
            .await
            .unwrap();

        assert!(matches!(
            event,
            Some(Event::DeviceStatus(DeviceStatus::Connected))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_without_subscribers_is_dropped() {
        let dispatcher = EventDispatcher::new(16);
        // No subscriber attached; must not panic or block.
        dispatcher.dispatch(Event::PendingSettingsChanged(true));

        // A later subscriber does not see the earlier event.
        let mut sub = dispatcher.subscribe();
        dispatcher.dispatch(Event::PendingSettingsChanged(false));
        let event = sub.recv().await.unwrap();
        assert!(matches!(event, Event::PendingSettingsChanged(false)));
    }

    #[tokio::test]
    async fn test_subscribers_see_events_in_order() {
        let dispatcher = EventDispatcher::new(16);
        let mut sub = dispatcher.subscribe();

        dispatcher.dispatch(Event::MeshHeartbeat(1));
        dispatcher.dispatch(Event::MeshHeartbeat(2));

        assert!(matches!(sub.recv().await, Some(Event::MeshHeartbeat(1))));
        assert!(matches!(sub.recv().await, Some(Event::MeshHeartbeat(2))));
    }
}
