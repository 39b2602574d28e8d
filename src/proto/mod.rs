//! Protocol-buffers schema for the Meshtastic host link.
//!
//! Hand-maintained `prost` definitions for the subset of the device schema
//! this client speaks: the `ToRadio`/`FromRadio` envelopes, mesh packets and
//! their decoded payloads, the administrative message surface, and the
//! in-band XMODEM transfer frames. Field numbers follow the published
//! firmware schema; unknown fields are skipped on decode, so newer firmware
//! remains readable.

/// Broadcast destination address.
pub const BROADCAST_ADDR: u32 = 0xFFFF_FFFF;

/// Host to radio envelope. Exactly one payload variant is set.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ToRadio {
    #[prost(oneof = "to_radio::PayloadVariant", tags = "1, 3, 4, 5, 7")]
    pub payload_variant: Option<to_radio::PayloadVariant>,
}

pub mod to_radio {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        /// Send this packet on the mesh.
        #[prost(message, tag = "1")]
        Packet(super::MeshPacket),
        /// Start the configuration push; the radio echoes this id back in
        /// `config_complete_id` when done.
        #[prost(uint32, tag = "3")]
        WantConfigId(u32),
        /// Tell the radio the client is going away.
        #[prost(bool, tag = "4")]
        Disconnect(bool),
        /// In-band file transfer frame.
        #[prost(message, tag = "5")]
        XmodemPacket(super::XModem),
        /// Periodic liveness nudge over stateless transports.
        #[prost(message, tag = "7")]
        Heartbeat(super::Heartbeat),
    }
}

/// Radio to host envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FromRadio {
    /// Monotonic frame counter (unused by this client).
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(
        oneof = "from_radio::PayloadVariant",
        tags = "2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14"
    )]
    pub payload_variant: Option<from_radio::PayloadVariant>,
}

pub mod from_radio {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "2")]
        Packet(super::MeshPacket),
        #[prost(message, tag = "3")]
        MyInfo(super::MyNodeInfo),
        #[prost(message, tag = "4")]
        NodeInfo(super::NodeInfo),
        #[prost(message, tag = "5")]
        Config(super::Config),
        #[prost(message, tag = "6")]
        LogRecord(super::LogRecord),
        #[prost(uint32, tag = "7")]
        ConfigCompleteId(u32),
        #[prost(bool, tag = "8")]
        Rebooted(bool),
        #[prost(message, tag = "9")]
        ModuleConfig(super::ModuleConfig),
        #[prost(message, tag = "10")]
        Channel(super::Channel),
        #[prost(message, tag = "11")]
        QueueStatus(super::QueueStatus),
        #[prost(message, tag = "12")]
        XmodemPacket(super::XModem),
        #[prost(message, tag = "13")]
        Metadata(super::DeviceMetadata),
        #[prost(message, tag = "14")]
        MqttClientProxyMessage(super::MqttClientProxyMessage),
    }
}

/// The radio's smallest routable unit.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeshPacket {
    #[prost(fixed32, tag = "1")]
    pub from: u32,
    #[prost(fixed32, tag = "2")]
    pub to: u32,
    #[prost(uint32, tag = "3")]
    pub channel: u32,
    #[prost(oneof = "mesh_packet::PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<mesh_packet::PayloadVariant>,
    #[prost(fixed32, tag = "6")]
    pub id: u32,
    /// Receive timestamp, seconds since the Unix epoch.
    #[prost(fixed32, tag = "7")]
    pub rx_time: u32,
    #[prost(float, tag = "8")]
    pub rx_snr: f32,
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
    #[prost(enumeration = "mesh_packet::Priority", tag = "11")]
    pub priority: i32,
    #[prost(int32, tag = "12")]
    pub rx_rssi: i32,
    #[prost(bool, tag = "14")]
    pub via_mqtt: bool,
    #[prost(uint32, tag = "15")]
    pub hop_start: u32,
}

pub mod mesh_packet {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "4")]
        Decoded(super::Data),
        #[prost(bytes = "vec", tag = "5")]
        Encrypted(Vec<u8>),
    }

    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Priority {
        Unset = 0,
        Min = 1,
        Background = 10,
        Default = 64,
        Reliable = 70,
        Ack = 120,
        Max = 127,
    }
}

/// Decoded application payload carried inside a mesh packet.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Data {
    #[prost(enumeration = "PortNum", tag = "1")]
    pub portnum: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(bool, tag = "3")]
    pub want_response: bool,
    #[prost(fixed32, tag = "4")]
    pub dest: u32,
    #[prost(fixed32, tag = "5")]
    pub source: u32,
    /// Id of the request packet this payload responds to.
    #[prost(fixed32, tag = "6")]
    pub request_id: u32,
    #[prost(fixed32, tag = "7")]
    pub reply_id: u32,
    #[prost(fixed32, tag = "8")]
    pub emoji: u32,
    #[prost(uint32, optional, tag = "9")]
    pub bitfield: Option<u32>,
}

/// Application multiplexer on top of mesh packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PortNum {
    UnknownApp = 0,
    TextMessageApp = 1,
    RemoteHardwareApp = 2,
    PositionApp = 3,
    NodeinfoApp = 4,
    RoutingApp = 5,
    AdminApp = 6,
    TextMessageCompressedApp = 7,
    WaypointApp = 8,
    AudioApp = 9,
    DetectionSensorApp = 10,
    ReplyApp = 32,
    IpTunnelApp = 33,
    PaxcounterApp = 34,
    SerialApp = 64,
    StoreForwardApp = 65,
    RangeTestApp = 66,
    TelemetryApp = 67,
    ZpsApp = 68,
    SimulatorApp = 69,
    TracerouteApp = 70,
    NeighborinfoApp = 71,
    AtakPlugin = 72,
    MapReportApp = 73,
    PrivateApp = 256,
    AtakForwarder = 257,
    Max = 511,
}

/// Delivery report the radio sends back for a prior packet, correlated by
/// the `request_id` of the enclosing [`Data`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Routing {
    #[prost(oneof = "routing::Variant", tags = "1, 2, 3")]
    pub variant: Option<routing::Variant>,
}

pub mod routing {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "1")]
        RouteRequest(super::RouteDiscovery),
        #[prost(message, tag = "2")]
        RouteReply(super::RouteDiscovery),
        #[prost(enumeration = "Error", tag = "3")]
        ErrorReason(i32),
    }

    /// Delivery failure reasons. `None` is a successful acknowledgement.
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Error {
        None = 0,
        NoRoute = 1,
        GotNak = 2,
        Timeout = 3,
        NoInterface = 4,
        MaxRetransmit = 5,
        NoChannel = 6,
        TooLarge = 7,
        NoResponse = 8,
        DutyCycleLimit = 9,
        BadRequest = 32,
        NotAuthorized = 33,
    }
}

/// Hop list produced by the traceroute port.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteDiscovery {
    #[prost(fixed32, repeated, tag = "1")]
    pub route: Vec<u32>,
    #[prost(int32, repeated, tag = "2")]
    pub snr_towards: Vec<i32>,
    #[prost(fixed32, repeated, tag = "3")]
    pub route_back: Vec<u32>,
    #[prost(int32, repeated, tag = "4")]
    pub snr_back: Vec<i32>,
}

/// The radio's self-identification, sent during the configuration push.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MyNodeInfo {
    #[prost(uint32, tag = "1")]
    pub my_node_num: u32,
    #[prost(uint32, tag = "8")]
    pub reboot_count: u32,
    #[prost(uint32, tag = "11")]
    pub min_app_version: u32,
}

/// A node in the radio's node database.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeInfo {
    #[prost(uint32, tag = "1")]
    pub num: u32,
    #[prost(message, optional, tag = "2")]
    pub user: Option<User>,
    #[prost(message, optional, tag = "3")]
    pub position: Option<Position>,
    #[prost(float, tag = "4")]
    pub snr: f32,
    #[prost(fixed32, tag = "5")]
    pub last_heard: u32,
    #[prost(message, optional, tag = "6")]
    pub device_metrics: Option<DeviceMetrics>,
    #[prost(uint32, tag = "7")]
    pub channel: u32,
    #[prost(bool, tag = "8")]
    pub via_mqtt: bool,
    #[prost(uint32, optional, tag = "9")]
    pub hops_away: Option<u32>,
}

/// Node owner identity.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub long_name: String,
    #[prost(string, tag = "3")]
    pub short_name: String,
    #[prost(int32, tag = "5")]
    pub hw_model: i32,
    #[prost(bool, tag = "6")]
    pub is_licensed: bool,
    #[prost(int32, tag = "7")]
    pub role: i32,
}

/// Geographic position, coordinates in 1e-7 degree units.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Position {
    #[prost(sfixed32, tag = "1")]
    pub latitude_i: i32,
    #[prost(sfixed32, tag = "2")]
    pub longitude_i: i32,
    #[prost(int32, tag = "3")]
    pub altitude: i32,
    #[prost(fixed32, tag = "4")]
    pub time: u32,
    #[prost(uint32, tag = "10")]
    pub sats_in_view: u32,
    #[prost(uint32, tag = "22")]
    pub precision_bits: u32,
}

/// Named point of interest shared over the waypoint port.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Waypoint {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(sfixed32, tag = "2")]
    pub latitude_i: i32,
    #[prost(sfixed32, tag = "3")]
    pub longitude_i: i32,
    #[prost(uint32, tag = "4")]
    pub expire: u32,
    #[prost(uint32, tag = "5")]
    pub locked_to: u32,
    #[prost(string, tag = "6")]
    pub name: String,
    #[prost(string, tag = "7")]
    pub description: String,
    #[prost(fixed32, tag = "8")]
    pub icon: u32,
}

/// Telemetry sample from the telemetry port.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Telemetry {
    #[prost(fixed32, tag = "1")]
    pub time: u32,
    #[prost(oneof = "telemetry::Variant", tags = "2, 3")]
    pub variant: Option<telemetry::Variant>,
}

pub mod telemetry {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "2")]
        DeviceMetrics(super::DeviceMetrics),
        #[prost(message, tag = "3")]
        EnvironmentMetrics(super::EnvironmentMetrics),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceMetrics {
    #[prost(uint32, tag = "1")]
    pub battery_level: u32,
    #[prost(float, tag = "2")]
    pub voltage: f32,
    #[prost(float, tag = "3")]
    pub channel_utilization: f32,
    #[prost(float, tag = "4")]
    pub air_util_tx: f32,
    #[prost(uint32, tag = "5")]
    pub uptime_seconds: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnvironmentMetrics {
    #[prost(float, tag = "1")]
    pub temperature: f32,
    #[prost(float, tag = "2")]
    pub relative_humidity: f32,
    #[prost(float, tag = "3")]
    pub barometric_pressure: f32,
}

/// Neighbour table broadcast by the neighbor-info module.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NeighborInfo {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(uint32, tag = "2")]
    pub last_sent_by_id: u32,
    #[prost(uint32, tag = "3")]
    pub node_broadcast_interval_secs: u32,
    #[prost(message, repeated, tag = "4")]
    pub neighbors: Vec<Neighbor>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Neighbor {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(float, tag = "2")]
    pub snr: f32,
}

/// People counter report from the paxcounter module.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Paxcount {
    #[prost(uint32, tag = "1")]
    pub wifi: u32,
    #[prost(uint32, tag = "2")]
    pub ble: u32,
    #[prost(uint32, tag = "3")]
    pub uptime: u32,
}

/// GPIO access message for the remote-hardware port.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HardwareMessage {
    #[prost(enumeration = "hardware_message::Type", tag = "1")]
    pub r#type: i32,
    #[prost(uint64, tag = "2")]
    pub gpio_mask: u64,
    #[prost(uint64, tag = "3")]
    pub gpio_value: u64,
}

pub mod hardware_message {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Type {
        Unset = 0,
        WriteGpios = 1,
        WatchGpios = 2,
        GpiosChanged = 3,
        ReadGpios = 4,
        ReadGpiosReply = 5,
    }
}

/// Debug log line forwarded from the firmware.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LogRecord {
    #[prost(string, tag = "1")]
    pub message: String,
    #[prost(fixed32, tag = "2")]
    pub time: u32,
    #[prost(string, tag = "3")]
    pub source: String,
    #[prost(enumeration = "log_record::Level", tag = "4")]
    pub level: i32,
}

pub mod log_record {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Level {
        Unset = 0,
        Trace = 5,
        Debug = 10,
        Info = 20,
        Warning = 30,
        Error = 40,
        Critical = 50,
    }
}

/// Snapshot of the radio's internal transmit queue.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueueStatus {
    #[prost(int32, tag = "1")]
    pub res: i32,
    #[prost(uint32, tag = "2")]
    pub free: u32,
    #[prost(uint32, tag = "3")]
    pub maxlen: u32,
    #[prost(uint32, tag = "4")]
    pub mesh_packet_id: u32,
}

/// Firmware and capability description.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceMetadata {
    #[prost(string, tag = "1")]
    pub firmware_version: String,
    #[prost(uint32, tag = "2")]
    pub device_state_version: u32,
    #[prost(bool, tag = "3")]
    pub can_shutdown: bool,
    #[prost(bool, tag = "4")]
    pub has_wifi: bool,
    #[prost(bool, tag = "5")]
    pub has_bluetooth: bool,
    #[prost(bool, tag = "6")]
    pub has_ethernet: bool,
    #[prost(int32, tag = "7")]
    pub role: i32,
    #[prost(uint32, tag = "8")]
    pub position_flags: u32,
    #[prost(int32, tag = "9")]
    pub hw_model: i32,
    #[prost(bool, tag = "10")]
    pub has_remote_hardware: bool,
}

/// Message proxied from the radio's MQTT client (ignored by this client).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MqttClientProxyMessage {
    #[prost(string, tag = "1")]
    pub topic: String,
    #[prost(oneof = "mqtt_client_proxy_message::PayloadVariant", tags = "2, 3")]
    pub payload_variant: Option<mqtt_client_proxy_message::PayloadVariant>,
    #[prost(bool, tag = "4")]
    pub retained: bool,
}

pub mod mqtt_client_proxy_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(bytes = "vec", tag = "2")]
        Data(Vec<u8>),
        #[prost(string, tag = "3")]
        Text(String),
    }
}

/// Liveness nudge; carries no payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Heartbeat {}

/// In-band block transfer frame (protobuf-framed XMODEM, not the 1977 wire
/// bytes).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct XModem {
    #[prost(enumeration = "xmodem::Control", tag = "1")]
    pub control: i32,
    #[prost(uint32, tag = "2")]
    pub seq: u32,
    #[prost(uint32, tag = "3")]
    pub crc16: u32,
    #[prost(bytes = "vec", tag = "4")]
    pub buffer: Vec<u8>,
}

pub mod xmodem {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Control {
        Nul = 0,
        Soh = 1,
        Stx = 2,
        Eot = 4,
        Ack = 6,
        Nak = 21,
        Can = 24,
    }
}

/// Channel slot on the radio.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Channel {
    #[prost(int32, tag = "1")]
    pub index: i32,
    #[prost(message, optional, tag = "2")]
    pub settings: Option<ChannelSettings>,
    #[prost(enumeration = "channel::Role", tag = "3")]
    pub role: i32,
}

pub mod channel {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Role {
        Disabled = 0,
        Primary = 1,
        Secondary = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelSettings {
    #[prost(uint32, tag = "1")]
    pub channel_num: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub psk: Vec<u8>,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(fixed32, tag = "4")]
    pub id: u32,
    #[prost(bool, tag = "5")]
    pub uplink_enabled: bool,
    #[prost(bool, tag = "6")]
    pub downlink_enabled: bool,
}

/// Device configuration; one section per variant.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Config {
    #[prost(oneof = "config::PayloadVariant", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub payload_variant: Option<config::PayloadVariant>,
}

pub mod config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "1")]
        Device(DeviceConfig),
        #[prost(message, tag = "2")]
        Position(PositionConfig),
        #[prost(message, tag = "3")]
        Power(PowerConfig),
        #[prost(message, tag = "4")]
        Network(NetworkConfig),
        #[prost(message, tag = "5")]
        Display(DisplayConfig),
        #[prost(message, tag = "6")]
        Lora(LoraConfig),
        #[prost(message, tag = "7")]
        Bluetooth(BluetoothConfig),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeviceConfig {
        #[prost(int32, tag = "1")]
        pub role: i32,
        #[prost(bool, tag = "2")]
        pub serial_enabled: bool,
        #[prost(uint32, tag = "6")]
        pub node_info_broadcast_secs: u32,
        #[prost(bool, tag = "7")]
        pub double_tap_as_button_press: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PositionConfig {
        #[prost(uint32, tag = "1")]
        pub position_broadcast_secs: u32,
        #[prost(bool, tag = "2")]
        pub position_broadcast_smart_enabled: bool,
        #[prost(bool, tag = "3")]
        pub fixed_position: bool,
        #[prost(bool, tag = "4")]
        pub gps_enabled: bool,
        #[prost(uint32, tag = "5")]
        pub gps_update_interval: u32,
        #[prost(uint32, tag = "7")]
        pub position_flags: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PowerConfig {
        #[prost(bool, tag = "1")]
        pub is_power_saving: bool,
        #[prost(uint32, tag = "2")]
        pub on_battery_shutdown_after_secs: u32,
        #[prost(uint32, tag = "6")]
        pub ls_secs: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NetworkConfig {
        #[prost(bool, tag = "1")]
        pub wifi_enabled: bool,
        #[prost(string, tag = "3")]
        pub wifi_ssid: String,
        #[prost(string, tag = "4")]
        pub wifi_psk: String,
        #[prost(string, tag = "5")]
        pub ntp_server: String,
        #[prost(bool, tag = "6")]
        pub eth_enabled: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DisplayConfig {
        #[prost(uint32, tag = "1")]
        pub screen_on_secs: u32,
        #[prost(bool, tag = "3")]
        pub compass_north_top: bool,
        #[prost(bool, tag = "4")]
        pub flip_screen: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LoraConfig {
        #[prost(bool, tag = "1")]
        pub use_preset: bool,
        #[prost(int32, tag = "2")]
        pub modem_preset: i32,
        #[prost(uint32, tag = "3")]
        pub bandwidth: u32,
        #[prost(uint32, tag = "4")]
        pub spread_factor: u32,
        #[prost(uint32, tag = "5")]
        pub coding_rate: u32,
        #[prost(float, tag = "6")]
        pub frequency_offset: f32,
        #[prost(int32, tag = "7")]
        pub region: i32,
        #[prost(uint32, tag = "8")]
        pub hop_limit: u32,
        #[prost(bool, tag = "9")]
        pub tx_enabled: bool,
        #[prost(int32, tag = "10")]
        pub tx_power: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct BluetoothConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(int32, tag = "2")]
        pub mode: i32,
        #[prost(uint32, tag = "3")]
        pub fixed_pin: u32,
    }
}

/// Module (application plugin) configuration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModuleConfig {
    #[prost(
        oneof = "module_config::PayloadVariant",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13"
    )]
    pub payload_variant: Option<module_config::PayloadVariant>,
}

pub mod module_config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "1")]
        Mqtt(MqttConfig),
        #[prost(message, tag = "2")]
        Serial(SerialConfig),
        #[prost(message, tag = "3")]
        ExternalNotification(ExternalNotificationConfig),
        #[prost(message, tag = "4")]
        StoreForward(StoreForwardConfig),
        #[prost(message, tag = "5")]
        RangeTest(RangeTestConfig),
        #[prost(message, tag = "6")]
        Telemetry(TelemetryConfig),
        #[prost(message, tag = "7")]
        CannedMessage(CannedMessageConfig),
        #[prost(message, tag = "8")]
        Audio(AudioConfig),
        #[prost(message, tag = "9")]
        RemoteHardware(RemoteHardwareConfig),
        #[prost(message, tag = "10")]
        NeighborInfo(NeighborInfoConfig),
        #[prost(message, tag = "11")]
        AmbientLighting(AmbientLightingConfig),
        #[prost(message, tag = "12")]
        DetectionSensor(DetectionSensorConfig),
        #[prost(message, tag = "13")]
        Paxcounter(PaxcounterConfig),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MqttConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(string, tag = "2")]
        pub address: String,
        #[prost(string, tag = "3")]
        pub username: String,
        #[prost(string, tag = "4")]
        pub password: String,
        #[prost(bool, tag = "5")]
        pub encryption_enabled: bool,
        #[prost(bool, tag = "9")]
        pub proxy_to_client_enabled: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SerialConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "4")]
        pub baud: u32,
        #[prost(int32, tag = "6")]
        pub mode: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ExternalNotificationConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "2")]
        pub output_ms: u32,
        #[prost(bool, tag = "8")]
        pub alert_message: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct StoreForwardConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(bool, tag = "2")]
        pub heartbeat: bool,
        #[prost(uint32, tag = "3")]
        pub records: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RangeTestConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "2")]
        pub sender: u32,
        #[prost(bool, tag = "3")]
        pub save: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TelemetryConfig {
        #[prost(uint32, tag = "1")]
        pub device_update_interval: u32,
        #[prost(uint32, tag = "2")]
        pub environment_update_interval: u32,
        #[prost(bool, tag = "3")]
        pub environment_measurement_enabled: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CannedMessageConfig {
        #[prost(bool, tag = "2")]
        pub enabled: bool,
        #[prost(string, tag = "11")]
        pub allow_input_source: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AudioConfig {
        #[prost(bool, tag = "1")]
        pub codec2_enabled: bool,
        #[prost(uint32, tag = "2")]
        pub ptt_pin: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RemoteHardwareConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(bool, tag = "2")]
        pub allow_undefined_pin_access: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct NeighborInfoConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "2")]
        pub update_interval: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AmbientLightingConfig {
        #[prost(bool, tag = "1")]
        pub led_state: bool,
        #[prost(uint32, tag = "2")]
        pub current: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DetectionSensorConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "2")]
        pub minimum_broadcast_secs: u32,
        #[prost(string, tag = "5")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PaxcounterConfig {
        #[prost(bool, tag = "1")]
        pub enabled: bool,
        #[prost(uint32, tag = "2")]
        pub paxcounter_update_interval: u32,
    }
}

/// Administrative control message carried on the ADMIN port.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AdminMessage {
    #[prost(
        oneof = "admin_message::PayloadVariant",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 21, 32, 33, 34, 35, 36, 38, 41, 42, 64, 65, 94, 95, 97, 98, 99, 100"
    )]
    pub payload_variant: Option<admin_message::PayloadVariant>,
}

pub mod admin_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        /// Request a channel slot; the value is the channel index plus one.
        #[prost(uint32, tag = "1")]
        GetChannelRequest(u32),
        #[prost(message, tag = "2")]
        GetChannelResponse(super::Channel),
        #[prost(bool, tag = "3")]
        GetOwnerRequest(bool),
        #[prost(message, tag = "4")]
        GetOwnerResponse(super::User),
        #[prost(enumeration = "ConfigType", tag = "5")]
        GetConfigRequest(i32),
        #[prost(message, tag = "6")]
        GetConfigResponse(super::Config),
        #[prost(enumeration = "ModuleConfigType", tag = "7")]
        GetModuleConfigRequest(i32),
        #[prost(message, tag = "8")]
        GetModuleConfigResponse(super::ModuleConfig),
        #[prost(bool, tag = "10")]
        GetCannedMessageModuleMessagesRequest(bool),
        #[prost(string, tag = "11")]
        GetCannedMessageModuleMessagesResponse(String),
        #[prost(bool, tag = "12")]
        GetDeviceMetadataRequest(bool),
        #[prost(message, tag = "13")]
        GetDeviceMetadataResponse(super::DeviceMetadata),
        #[prost(bool, tag = "21")]
        EnterDfuModeRequest(bool),
        #[prost(message, tag = "32")]
        SetOwner(super::User),
        #[prost(message, tag = "33")]
        SetChannel(super::Channel),
        #[prost(message, tag = "34")]
        SetConfig(super::Config),
        #[prost(message, tag = "35")]
        SetModuleConfig(super::ModuleConfig),
        #[prost(string, tag = "36")]
        SetCannedMessageModuleMessages(String),
        #[prost(uint32, tag = "38")]
        RemoveByNodenum(u32),
        #[prost(message, tag = "41")]
        SetFixedPosition(super::Position),
        #[prost(bool, tag = "42")]
        RemoveFixedPosition(bool),
        #[prost(bool, tag = "64")]
        BeginEditSettings(bool),
        #[prost(bool, tag = "65")]
        CommitEditSettings(bool),
        #[prost(int32, tag = "94")]
        FactoryResetDevice(i32),
        #[prost(int32, tag = "95")]
        RebootOtaSeconds(i32),
        #[prost(int32, tag = "97")]
        RebootSeconds(i32),
        #[prost(int32, tag = "98")]
        ShutdownSeconds(i32),
        #[prost(int32, tag = "99")]
        FactoryResetConfig(i32),
        #[prost(int32, tag = "100")]
        NodedbReset(i32),
    }

    /// Selector for [`PayloadVariant::GetConfigRequest`].
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum ConfigType {
        DeviceConfig = 0,
        PositionConfig = 1,
        PowerConfig = 2,
        NetworkConfig = 3,
        DisplayConfig = 4,
        LoraConfig = 5,
        BluetoothConfig = 6,
    }

    /// Selector for [`PayloadVariant::GetModuleConfigRequest`].
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum ModuleConfigType {
        MqttConfig = 0,
        SerialConfig = 1,
        ExtnotifConfig = 2,
        StoreforwardConfig = 3,
        RangetestConfig = 4,
        TelemetryConfig = 5,
        CannedmsgConfig = 6,
        AudioConfig = 7,
        RemotehardwareConfig = 8,
        NeighborinfoConfig = 9,
        AmbientlightingConfig = 10,
        DetectionsensorConfig = 11,
        PaxcounterConfig = 12,
    }
}
