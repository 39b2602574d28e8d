//! Main [`MeshDevice`] session implementation.
//!
//! The session owns the transport, transmit queue, event dispatcher and
//! XMODEM engine. It drives the configuration lifecycle, demultiplexes the
//! radio's message stream into typed events, and correlates outbound
//! packets with the radio's routing acknowledgements.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex};

use bytes::Bytes;
use prost::Message;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{Event, EventDispatcher, Subscription};
use crate::proto::{self, PortNum};
use crate::protocol::{generate_packet_id, SendHandle, TxQueue, XmodemEngine, XmodemOutcome};
use crate::transport::{HttpTransport, SerialTransport, Transport};
use crate::transport::http::HttpConfig;
use crate::transport::serial::SerialConfig;
use crate::types::{ChannelIndex, Destination, DeviceStatus, PacketKind, PacketMetadata};

/// Oldest firmware this client is known to work with. Radios reporting an
/// older version are logged loudly but the session continues.
pub const MIN_FIRMWARE_VERSION: f32 = 2.3;

/// Gets the current Unix timestamp as a u32.
pub(crate) fn current_timestamp() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Parses the leading `major.minor` of a firmware version string
/// (e.g. "2.3.6.1a2b3c4") into a comparable number.
fn parse_firmware_version(version: &str) -> Option<f32> {
    let mut parts = version.split('.');
    let major = parts.next()?;
    let minor = parts.next().unwrap_or("0");
    format!("{major}.{minor}").parse().ok()
}

/// Options for [`MeshDevice::send_packet`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Application port the payload belongs to.
    pub port: PortNum,
    /// Where the packet is addressed.
    pub destination: Destination,
    /// Channel slot to send on.
    pub channel: ChannelIndex,
    /// Request a routed acknowledgement from the destination.
    pub want_ack: bool,
    /// Ask the destination application to respond.
    pub want_response: bool,
    /// Inject the packet into the inbound dispatcher before transmission,
    /// so the caller observes its own send.
    pub echo_response: bool,
    /// Id of the packet this one replies to (0 for none).
    pub reply_id: u32,
    /// Emoji tapback code (0 for none).
    pub emoji: u32,
}

impl SendOptions {
    /// Creates options for the given port with broadcast destination on
    /// the primary channel and no flags set.
    #[must_use]
    pub fn new(port: PortNum) -> Self {
        Self {
            port,
            destination: Destination::Broadcast,
            channel: ChannelIndex::Primary,
            want_ack: false,
            want_response: false,
            echo_response: false,
            reply_id: 0,
            emoji: 0,
        }
    }

    /// Sets the destination.
    #[must_use]
    pub const fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Sets the channel slot.
    #[must_use]
    pub const fn channel(mut self, channel: ChannelIndex) -> Self {
        self.channel = channel;
        self
    }

    /// Requests a routed acknowledgement.
    #[must_use]
    pub const fn want_ack(mut self, want_ack: bool) -> Self {
        self.want_ack = want_ack;
        self
    }

    /// Asks the destination application to respond.
    #[must_use]
    pub const fn want_response(mut self, want_response: bool) -> Self {
        self.want_response = want_response;
        self
    }

    /// Echoes the packet to the inbound dispatcher before transmission.
    #[must_use]
    pub const fn echo_response(mut self, echo_response: bool) -> Self {
        self.echo_response = echo_response;
        self
    }

    /// Marks this packet as a reply to an earlier one.
    #[must_use]
    pub const fn reply_id(mut self, reply_id: u32) -> Self {
        self.reply_id = reply_id;
        self
    }

    /// Attaches an emoji tapback code.
    #[must_use]
    pub const fn emoji(mut self, emoji: u32) -> Self {
        self.emoji = emoji;
        self
    }
}

/// Shared session state; everything the background pump and the public
/// API both touch.
pub(crate) struct SessionState<T> {
    pub(crate) transport: Mutex<T>,
    pub(crate) queue: TxQueue,
    pub(crate) dispatcher: EventDispatcher,
    pub(crate) xmodem: StdMutex<XmodemEngine>,
    status: StdMutex<DeviceStatus>,
    my_node: StdMutex<Option<proto::MyNodeInfo>>,
    config_nonce: u32,
    pub(crate) edit_pending: AtomicBool,
}

impl<T: Transport> SessionState<T> {
    /// Current session status.
    pub(crate) fn status(&self) -> DeviceStatus {
        *self.status.lock().expect("state lock poisoned")
    }

    /// Updates the status and publishes the transition.
    pub(crate) fn set_status(&self, status: DeviceStatus) {
        {
            let mut current = self.status.lock().expect("state lock poisoned");
            if *current == status {
                return;
            }
            tracing::debug!("device status: {:?} -> {status:?}", *current);
            *current = status;
        }
        self.dispatcher.dispatch(Event::DeviceStatus(status));
    }

    /// Node number the radio reported for itself, if known.
    pub(crate) fn my_node_num(&self) -> Option<u32> {
        self.my_node
            .lock()
            .expect("state lock poisoned")
            .as_ref()
            .map(|info| info.my_node_num)
    }

    /// Starts the configuration lockstep: status goes to `Configuring` and
    /// the radio is asked to push its configuration, tagged with our nonce.
    pub(crate) async fn configure(&self) -> Result<()> {
        tracing::debug!("requesting configuration, nonce 0x{:08x}", self.config_nonce);
        self.set_status(DeviceStatus::Configuring);
        let message = proto::ToRadio {
            payload_variant: Some(proto::to_radio::PayloadVariant::WantConfigId(
                self.config_nonce,
            )),
        };
        self.send_raw(message).await?;
        Ok(())
    }

    /// Cancels all pending sends, releasing their waiters.
    pub(crate) fn complete(&self) {
        self.queue.clear();
    }

    /// Serializes a `ToRadio` frame and pushes it through the queue
    /// without waiting for any acknowledgement.
    pub(crate) async fn send_raw(&self, message: proto::ToRadio) -> Result<u32> {
        let id = generate_packet_id()?;
        let _ = self.queue.enqueue(id, Bytes::from(message.encode_to_vec()))?;
        self.drain().await;
        Ok(id)
    }

    /// Builds and transmits a mesh packet per the send contract.
    pub(crate) async fn send_packet(
        &self,
        byte_data: Vec<u8>,
        options: SendOptions,
    ) -> Result<SendHandle> {
        let id = generate_packet_id()?;
        let my_node = self.my_node_num();
        let to = options.destination.resolve(my_node)?;

        let data = proto::Data {
            portnum: options.port as i32,
            payload: byte_data,
            want_response: options.want_response,
            reply_id: options.reply_id,
            emoji: options.emoji,
            ..proto::Data::default()
        };
        let packet = proto::MeshPacket {
            from: my_node.unwrap_or(0),
            to,
            channel: options.channel.into(),
            id,
            want_ack: options.want_ack,
            payload_variant: Some(proto::mesh_packet::PayloadVariant::Decoded(data)),
            ..proto::MeshPacket::default()
        };

        if options.echo_response {
            let mut echo = packet.clone();
            echo.rx_time = current_timestamp();
            // The caller observes its own send before it hits the wire.
            if let Err(e) = self.handle_mesh_packet(echo).await {
                tracing::warn!("echo dispatch failed: {e}");
            }
        }

        let message = proto::ToRadio {
            payload_variant: Some(proto::to_radio::PayloadVariant::Packet(packet)),
        };
        let handle = self.queue.enqueue(id, Bytes::from(message.encode_to_vec()))?;
        self.drain().await;
        Ok(handle)
    }

    /// Drains the queue, mapping transport failure onto the session status.
    async fn drain(&self) {
        if let Err(e) = self.queue.drain(&self.transport).await {
            tracing::warn!("transmit drain failed: {e}");
            self.set_status(DeviceStatus::Disconnecting);
            self.set_status(DeviceStatus::Disconnected);
        }
    }

    /// Decodes one inbound payload and routes it.
    pub(crate) async fn handle_frame(&self, frame: &[u8]) -> Result<()> {
        let from_radio = proto::FromRadio::decode(frame)?;
        self.handle_from_radio(from_radio).await
    }

    /// The fromRadio demultiplexer.
    pub(crate) async fn handle_from_radio(&self, from_radio: proto::FromRadio) -> Result<()> {
        use proto::from_radio::PayloadVariant;

        self.dispatcher
            .dispatch(Event::FromRadio(Box::new(from_radio.clone())));

        let Some(variant) = from_radio.payload_variant else {
            tracing::warn!("fromRadio frame without payload variant");
            return Ok(());
        };

        match variant {
            PayloadVariant::Packet(packet) => self.handle_mesh_packet(packet).await?,
            PayloadVariant::MyInfo(info) => {
                tracing::debug!("my node number is {}", info.my_node_num);
                *self.my_node.lock().expect("state lock poisoned") = Some(info.clone());
                self.dispatcher.dispatch(Event::MyNodeInfo(info));
            }
            PayloadVariant::NodeInfo(node) => self.handle_node_info(node),
            PayloadVariant::Config(config) => {
                self.dispatcher.dispatch(Event::Config(Box::new(config)));
            }
            PayloadVariant::LogRecord(record) => {
                self.dispatcher.dispatch(Event::LogRecord(Box::new(record)));
            }
            PayloadVariant::ConfigCompleteId(id) => {
                if id != self.config_nonce {
                    // Known firmware quirk: proceed anyway.
                    tracing::error!(
                        "configCompleteId 0x{id:08x} does not match requested 0x{:08x}",
                        self.config_nonce
                    );
                }
                tracing::debug!("configuration complete");
                self.set_status(DeviceStatus::Configured);
            }
            PayloadVariant::Rebooted(_) => {
                tracing::info!("radio rebooted, reconfiguring");
                self.configure().await?;
            }
            PayloadVariant::ModuleConfig(config) => {
                self.dispatcher
                    .dispatch(Event::ModuleConfig(Box::new(config)));
            }
            PayloadVariant::Channel(channel) => {
                self.dispatcher.dispatch(Event::Channel(Box::new(channel)));
            }
            PayloadVariant::QueueStatus(status) => {
                self.dispatcher.dispatch(Event::QueueStatus(status));
            }
            PayloadVariant::XmodemPacket(packet) => {
                let outcome = self
                    .xmodem
                    .lock()
                    .expect("state lock poisoned")
                    .handle_packet(packet);
                if let XmodemOutcome::ReceiveComplete(buffer) = outcome {
                    self.dispatcher.dispatch(Event::XmodemReceived(buffer));
                }
            }
            PayloadVariant::Metadata(metadata) => {
                match parse_firmware_version(&metadata.firmware_version) {
                    Some(version) if version < MIN_FIRMWARE_VERSION => {
                        tracing::error!(
                            "firmware {} is older than the minimum supported {MIN_FIRMWARE_VERSION}",
                            metadata.firmware_version
                        );
                    }
                    Some(_) => {}
                    None => {
                        tracing::warn!(
                            "unparseable firmware version {:?}",
                            metadata.firmware_version
                        );
                    }
                }
                self.dispatcher
                    .dispatch(Event::DeviceMetadata(Box::new(metadata)));
            }
            PayloadVariant::MqttClientProxyMessage(_) => {
                // MQTT proxying is the bridge application's concern.
            }
        }
        Ok(())
    }

    fn handle_node_info(&self, node: proto::NodeInfo) {
        self.dispatcher
            .dispatch(Event::NodeInfo(Box::new(node.clone())));

        // Embedded position and user blocks are surfaced as if the node had
        // sent them directly.
        if let Some(position) = node.position {
            self.dispatcher
                .dispatch(Event::Position(synthetic_metadata(node.num, position)));
        }
        if let Some(user) = node.user {
            self.dispatcher
                .dispatch(Event::User(synthetic_metadata(node.num, user)));
        }
    }

    /// Mesh packet handling: heartbeat bookkeeping, then payload dispatch.
    pub(crate) async fn handle_mesh_packet(&self, packet: proto::MeshPacket) -> Result<()> {
        use proto::mesh_packet::PayloadVariant;

        self.dispatcher
            .dispatch(Event::MeshPacket(Box::new(packet.clone())));

        if self.my_node_num() != Some(packet.from) {
            // Any foreign packet counts as proof the mesh is alive.
            self.dispatcher
                .dispatch(Event::MeshHeartbeat(current_timestamp()));
        }

        match packet.payload_variant.clone() {
            Some(PayloadVariant::Decoded(data)) => self.handle_decoded(&packet, data),
            Some(PayloadVariant::Encrypted(_)) => {
                tracing::debug!("dropping encrypted packet {} (no channel key)", packet.id);
                Ok(())
            }
            None => Err(Error::Protocol {
                message: format!("mesh packet {} has no payload variant", packet.id),
            }),
        }
    }

    /// Dispatches a decoded payload to its typed per-port event channel.
    #[allow(clippy::too_many_lines)]
    fn handle_decoded(&self, packet: &proto::MeshPacket, data: proto::Data) -> Result<()> {
        let kind = if packet.to == proto::BROADCAST_ADDR {
            PacketKind::Broadcast
        } else {
            PacketKind::Direct
        };
        let port = PortNum::try_from(data.portnum).unwrap_or(PortNum::UnknownApp);

        match port {
            PortNum::TextMessageApp => {
                let text = String::from_utf8_lossy(&data.payload).into_owned();
                self.dispatcher
                    .dispatch(Event::Message(metadata_for(packet, kind, text)));
            }
            PortNum::RemoteHardwareApp => {
                match proto::HardwareMessage::decode(data.payload.as_slice()) {
                    Ok(message) => self
                        .dispatcher
                        .dispatch(Event::RemoteHardware(metadata_for(packet, kind, message))),
                    Err(e) => tracing::warn!("failed to decode HardwareMessage: {e}"),
                }
            }
            PortNum::PositionApp => match proto::Position::decode(data.payload.as_slice()) {
                Ok(position) => self
                    .dispatcher
                    .dispatch(Event::Position(metadata_for(packet, kind, position))),
                Err(e) => tracing::warn!("failed to decode Position: {e}"),
            },
            PortNum::NodeinfoApp => match proto::User::decode(data.payload.as_slice()) {
                Ok(user) => self
                    .dispatcher
                    .dispatch(Event::User(metadata_for(packet, kind, user))),
                Err(e) => tracing::warn!("failed to decode User: {e}"),
            },
            PortNum::RoutingApp => match proto::Routing::decode(data.payload.as_slice()) {
                Ok(routing) => {
                    self.dispatcher
                        .dispatch(Event::Routing(metadata_for(packet, kind, routing.clone())));
                    if let Some(proto::routing::Variant::ErrorReason(reason)) = routing.variant {
                        self.resolve_routing(data.request_id, reason);
                    }
                }
                Err(e) => tracing::warn!("failed to decode Routing: {e}"),
            },
            PortNum::AdminApp => match proto::AdminMessage::decode(data.payload.as_slice()) {
                Ok(admin) => self.handle_admin_response(admin),
                Err(e) => tracing::warn!("failed to decode AdminMessage: {e}"),
            },
            PortNum::TextMessageCompressedApp => {
                // The firmware decompresses before handing packets to
                // clients; a compressed payload here is unexpected.
                tracing::debug!("dropping compressed text packet {}", packet.id);
            }
            PortNum::WaypointApp => match proto::Waypoint::decode(data.payload.as_slice()) {
                Ok(waypoint) => self
                    .dispatcher
                    .dispatch(Event::Waypoint(metadata_for(packet, kind, waypoint))),
                Err(e) => tracing::warn!("failed to decode Waypoint: {e}"),
            },
            PortNum::TelemetryApp => match proto::Telemetry::decode(data.payload.as_slice()) {
                Ok(telemetry) => self
                    .dispatcher
                    .dispatch(Event::Telemetry(metadata_for(packet, kind, telemetry))),
                Err(e) => tracing::warn!("failed to decode Telemetry: {e}"),
            },
            PortNum::TracerouteApp => {
                match proto::RouteDiscovery::decode(data.payload.as_slice()) {
                    Ok(route) => self
                        .dispatcher
                        .dispatch(Event::Traceroute(metadata_for(packet, kind, route))),
                    Err(e) => tracing::warn!("failed to decode RouteDiscovery: {e}"),
                }
            }
            PortNum::NeighborinfoApp => {
                match proto::NeighborInfo::decode(data.payload.as_slice()) {
                    Ok(info) => self
                        .dispatcher
                        .dispatch(Event::NeighborInfo(metadata_for(packet, kind, info))),
                    Err(e) => tracing::warn!("failed to decode NeighborInfo: {e}"),
                }
            }
            PortNum::PaxcounterApp => match proto::Paxcount::decode(data.payload.as_slice()) {
                Ok(pax) => self
                    .dispatcher
                    .dispatch(Event::Paxcount(metadata_for(packet, kind, pax))),
                Err(e) => tracing::warn!("failed to decode Paxcount: {e}"),
            },
            PortNum::AudioApp => self
                .dispatcher
                .dispatch(Event::Audio(metadata_for(packet, kind, data.payload))),
            PortNum::DetectionSensorApp => self
                .dispatcher
                .dispatch(Event::DetectionSensor(metadata_for(packet, kind, data.payload))),
            PortNum::IpTunnelApp => self
                .dispatcher
                .dispatch(Event::IpTunnel(metadata_for(packet, kind, data.payload))),
            PortNum::SerialApp => self
                .dispatcher
                .dispatch(Event::Serial(metadata_for(packet, kind, data.payload))),
            PortNum::StoreForwardApp => self
                .dispatcher
                .dispatch(Event::StoreForward(metadata_for(packet, kind, data.payload))),
            PortNum::RangeTestApp => self
                .dispatcher
                .dispatch(Event::RangeTest(metadata_for(packet, kind, data.payload))),
            PortNum::ZpsApp => self
                .dispatcher
                .dispatch(Event::Zps(metadata_for(packet, kind, data.payload))),
            PortNum::SimulatorApp => self
                .dispatcher
                .dispatch(Event::Simulator(metadata_for(packet, kind, data.payload))),
            PortNum::AtakPlugin => self
                .dispatcher
                .dispatch(Event::Atak(metadata_for(packet, kind, data.payload))),
            PortNum::MapReportApp => self
                .dispatcher
                .dispatch(Event::MapReport(metadata_for(packet, kind, data.payload))),
            PortNum::PrivateApp => self
                .dispatcher
                .dispatch(Event::Private(metadata_for(packet, kind, data.payload))),
            PortNum::AtakForwarder => self
                .dispatcher
                .dispatch(Event::AtakForwarder(metadata_for(packet, kind, data.payload))),
            PortNum::ReplyApp => self
                .dispatcher
                .dispatch(Event::Reply(metadata_for(packet, kind, data.payload))),
            PortNum::UnknownApp | PortNum::Max => {
                tracing::warn!("unhandled port {} on packet {}", data.portnum, packet.id);
            }
        }
        Ok(())
    }

    /// Correlates a routing report with the pending send it answers.
    fn resolve_routing(&self, request_id: u32, reason: i32) {
        match proto::routing::Error::try_from(reason) {
            // NONE is the firmware's way of saying "delivered".
            Ok(proto::routing::Error::None) => self.queue.process_ack(request_id),
            Ok(error) => self.queue.process_error(request_id, error),
            Err(_) => tracing::warn!("unknown routing error reason {reason}"),
        }
    }

    /// Re-routes admin response variants as top-level events.
    fn handle_admin_response(&self, admin: proto::AdminMessage) {
        use proto::admin_message::PayloadVariant;

        match admin.payload_variant {
            Some(PayloadVariant::GetConfigResponse(config)) => {
                self.dispatcher.dispatch(Event::Config(Box::new(config)));
            }
            Some(PayloadVariant::GetModuleConfigResponse(config)) => {
                self.dispatcher
                    .dispatch(Event::ModuleConfig(Box::new(config)));
            }
            Some(PayloadVariant::GetChannelResponse(channel)) => {
                self.dispatcher.dispatch(Event::Channel(Box::new(channel)));
            }
            Some(PayloadVariant::GetOwnerResponse(user)) => {
                self.dispatcher.dispatch(Event::Owner(Box::new(user)));
            }
            Some(PayloadVariant::GetDeviceMetadataResponse(metadata)) => {
                self.dispatcher
                    .dispatch(Event::DeviceMetadata(Box::new(metadata)));
            }
            Some(other) => {
                tracing::debug!("ignoring non-response admin variant: {other:?}");
            }
            None => tracing::warn!("admin message without payload variant"),
        }
    }
}

/// Builds the envelope for an event synthesized out of a node-info block,
/// attributed to the node itself.
fn synthetic_metadata<D>(num: u32, data: D) -> PacketMetadata<D> {
    PacketMetadata {
        id: 0,
        rx_time: current_timestamp(),
        from: num,
        to: num,
        channel: u32::from(ChannelIndex::Primary),
        kind: PacketKind::Direct,
        data,
    }
}

/// Builds the common packet envelope for a typed event.
fn metadata_for<D>(packet: &proto::MeshPacket, kind: PacketKind, data: D) -> PacketMetadata<D> {
    PacketMetadata {
        id: packet.id,
        rx_time: packet.rx_time,
        from: packet.from,
        to: packet.to,
        channel: packet.channel,
        kind,
        data,
    }
}

/// Client session for one attached radio.
///
/// Multiple sessions may coexist, each addressing a different radio; there
/// is no shared global state.
pub struct MeshDevice<T: Transport> {
    pub(crate) state: Arc<SessionState<T>>,
    xmodem_rx: Option<mpsc::UnboundedReceiver<proto::XModem>>,
    pump_task: Option<JoinHandle<()>>,
    xmodem_task: Option<JoinHandle<()>>,
}

impl MeshDevice<SerialTransport> {
    /// Creates a session for a radio on a serial port.
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a session with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl MeshDevice<HttpTransport> {
    /// Creates a session for a network-attached radio.
    #[must_use]
    pub fn http(address: impl Into<String>) -> Self {
        Self::with_http_config(HttpConfig::new(address))
    }

    /// Creates a session with custom HTTP configuration.
    #[must_use]
    pub fn with_http_config(config: HttpConfig) -> Self {
        Self::new(HttpTransport::new(config))
    }
}

impl<T: Transport + 'static> MeshDevice<T> {
    /// Creates a session over the given transport with a random
    /// configuration lockstep id.
    #[must_use]
    pub fn new(transport: T) -> Self {
        let mut nonce: u32 = rand::random();
        if nonce == 0 {
            nonce = 1;
        }
        Self::with_config_id(transport, nonce)
    }

    /// Creates a session with a caller-chosen configuration lockstep id,
    /// for deterministic testing.
    #[must_use]
    pub fn with_config_id(transport: T, config_id: u32) -> Self {
        let (xmodem_tx, xmodem_rx) = mpsc::unbounded_channel();

        let state = Arc::new(SessionState {
            transport: Mutex::new(transport),
            queue: TxQueue::new(),
            dispatcher: EventDispatcher::new(256),
            xmodem: StdMutex::new(XmodemEngine::new(xmodem_tx)),
            status: StdMutex::new(DeviceStatus::Disconnected),
            my_node: StdMutex::new(None),
            config_nonce: config_id,
            edit_pending: AtomicBool::new(false),
        });

        Self {
            state,
            xmodem_rx: Some(xmodem_rx),
            pump_task: None,
            xmodem_task: None,
        }
    }

    /// Connects the transport, starts the inbound pump and kicks off the
    /// configuration lockstep.
    pub async fn connect(&mut self) -> Result<()> {
        self.state.set_status(DeviceStatus::Connecting);
        {
            let mut transport = self.state.transport.lock().await;
            transport.connect().await?;
        }
        self.state.set_status(DeviceStatus::Connected);

        let frame_rx = {
            let mut transport = self.state.transport.lock().await;
            transport.take_frames()
        }
        .ok_or(Error::NotConnected)?;
        self.start_pump(frame_rx);

        if let Some(xmodem_rx) = self.xmodem_rx.take() {
            self.start_xmodem_forwarder(xmodem_rx);
        }

        self.state.configure().await
    }

    /// Disconnects from the radio, cancelling all pending sends.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.state.set_status(DeviceStatus::Disconnecting);
        self.state.complete();
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
        let result = {
            let mut transport = self.state.transport.lock().await;
            transport.disconnect().await
        };
        // The session is torn down at this point even if the transport
        // failed to close cleanly; Disconnecting must not be terminal.
        self.state.set_status(DeviceStatus::Disconnected);
        result
    }

    /// Re-runs the configuration lockstep.
    pub async fn configure(&self) -> Result<()> {
        self.state.configure().await
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        self.state.status()
    }

    /// The radio's self-identification, once received.
    #[must_use]
    pub fn my_node_info(&self) -> Option<proto::MyNodeInfo> {
        self.state
            .my_node
            .lock()
            .expect("state lock poisoned")
            .clone()
    }

    /// Returns true if the transport link is up.
    pub async fn is_connected(&self) -> bool {
        self.state.transport.lock().await.is_connected()
    }

    /// Checks transport liveness.
    pub async fn ping(&self) -> Result<bool> {
        let mut transport = self.state.transport.lock().await;
        transport.ping().await
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.state.dispatcher.subscribe()
    }

    /// Cancels all pending sends, releasing their waiters with a
    /// cancellation error.
    pub fn complete(&self) {
        self.state.complete();
    }

    /// Sends a text message.
    ///
    /// The message is echoed to the local dispatcher, so subscribers see
    /// the send as an inbound [`Event::Message`] too.
    pub async fn send_text(
        &self,
        text: &str,
        destination: Destination,
        channel: ChannelIndex,
        want_ack: bool,
    ) -> Result<SendHandle> {
        let options = SendOptions::new(PortNum::TextMessageApp)
            .destination(destination)
            .channel(channel)
            .want_ack(want_ack)
            .echo_response(true);
        self.state
            .send_packet(text.as_bytes().to_vec(), options)
            .await
    }

    /// Sends a waypoint.
    pub async fn send_waypoint(
        &self,
        waypoint: proto::Waypoint,
        destination: Destination,
        channel: ChannelIndex,
    ) -> Result<SendHandle> {
        let options = SendOptions::new(PortNum::WaypointApp)
            .destination(destination)
            .channel(channel)
            .want_ack(true)
            .echo_response(true);
        self.state
            .send_packet(waypoint.encode_to_vec(), options)
            .await
    }

    /// Sends an arbitrary application payload as a mesh packet.
    ///
    /// Generates a fresh packet id and returns a handle resolving when the
    /// radio acknowledges or rejects the packet.
    pub async fn send_packet(
        &self,
        byte_data: Vec<u8>,
        options: SendOptions,
    ) -> Result<SendHandle> {
        self.state.send_packet(byte_data, options).await
    }

    /// Sends a liveness nudge to the radio.
    pub async fn heartbeat(&self) -> Result<()> {
        let message = proto::ToRadio {
            payload_variant: Some(proto::to_radio::PayloadVariant::Heartbeat(
                proto::Heartbeat {},
            )),
        };
        self.state.send_raw(message).await?;
        Ok(())
    }

    /// Transfers a file to the radio over the in-band XMODEM channel and
    /// waits for the transfer to complete.
    pub async fn send_file(&self, data: &[u8]) -> Result<()> {
        let done = {
            let mut engine = self.state.xmodem.lock().expect("state lock poisoned");
            engine.start_send(data)?
        };
        done.await.map_err(|_| Error::Cancelled)?
    }

    fn start_pump(&mut self, mut frame_rx: mpsc::Receiver<Bytes>) {
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
        let state = Arc::clone(&self.state);
        self.pump_task = Some(tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if let Err(e) = state.handle_frame(&frame).await {
                    tracing::warn!("failed to process frame: {e}");
                }
            }
            // The transport's pump is gone; treat the link as dead.
            tracing::debug!("inbound frame stream ended");
            state.complete();
            state.set_status(DeviceStatus::Disconnecting);
            state.set_status(DeviceStatus::Disconnected);
        }));
    }

    fn start_xmodem_forwarder(&mut self, mut rx: mpsc::UnboundedReceiver<proto::XModem>) {
        let state = Arc::clone(&self.state);
        self.xmodem_task = Some(tokio::spawn(async move {
            while let Some(packet) = rx.recv().await {
                let message = proto::ToRadio {
                    payload_variant: Some(proto::to_radio::PayloadVariant::XmodemPacket(packet)),
                };
                if let Err(e) = state.send_raw(message).await {
                    tracing::warn!("failed to send xmodem frame: {e}");
                }
            }
        }));
    }
}

impl<T: Transport> Drop for MeshDevice<T> {
    fn drop(&mut self) {
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
        if let Some(task) = self.xmodem_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_firmware_version() {
        assert_eq!(parse_firmware_version("2.3.6.1a2b3c4"), Some(2.3));
        assert_eq!(parse_firmware_version("1.2"), Some(1.2));
        assert_eq!(parse_firmware_version("2"), Some(2.0));
        assert_eq!(parse_firmware_version("garbage"), None);
    }

    #[test]
    fn test_send_options_builder() {
        let options = SendOptions::new(PortNum::TextMessageApp)
            .destination(Destination::Node(9))
            .channel(ChannelIndex::Channel2)
            .want_ack(true)
            .echo_response(true);

        assert_eq!(options.port, PortNum::TextMessageApp);
        assert_eq!(options.destination, Destination::Node(9));
        assert_eq!(options.channel, ChannelIndex::Channel2);
        assert!(options.want_ack);
        assert!(!options.want_response);
        assert!(options.echo_response);
    }
}
