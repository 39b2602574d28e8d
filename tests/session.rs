//! End-to-end session tests over a scripted in-memory transport.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use prost::Message;
use tokio::sync::mpsc;

use meshtastic_client::proto::{self, PortNum};
use meshtastic_client::transport::{BoxFuture, Transport};
use meshtastic_client::{
    ChannelIndex, Destination, DeviceStatus, Error, Event, MeshDevice, SendOptions, Subscription,
};

/// State shared between a [`MockTransport`] and the test body.
struct Shared {
    /// Every payload the session wrote, in order.
    writes: StdMutex<Vec<Bytes>>,
    /// Sender half of the inbound pump, available once connected.
    injector: StdMutex<Option<mpsc::Sender<Bytes>>>,
}

impl Shared {
    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn to_radio(&self, index: usize) -> proto::ToRadio {
        let writes = self.writes.lock().unwrap();
        proto::ToRadio::decode(writes[index].as_ref()).expect("captured write decodes")
    }
}

/// In-memory transport: captures writes, lets the test inject frames.
struct MockTransport {
    shared: Arc<Shared>,
    frame_rx: Option<mpsc::Receiver<Bytes>>,
    connected: bool,
}

impl Transport for MockTransport {
    fn connect(&mut self) -> BoxFuture<'_, meshtastic_client::Result<()>> {
        Box::pin(async move {
            let (tx, rx) = mpsc::channel(64);
            *self.shared.injector.lock().unwrap() = Some(tx);
            self.frame_rx = Some(rx);
            self.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, meshtastic_client::Result<()>> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> BoxFuture<'_, meshtastic_client::Result<()>> {
        self.shared.writes.lock().unwrap().push(data);
        Box::pin(async move { Ok(()) })
    }

    fn ping(&mut self) -> BoxFuture<'_, meshtastic_client::Result<bool>> {
        let connected = self.connected;
        Box::pin(async move { Ok(connected) })
    }

    fn take_frames(&mut self) -> Option<mpsc::Receiver<Bytes>> {
        self.frame_rx.take()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

fn mock_device(config_id: u32) -> (MeshDevice<MockTransport>, Arc<Shared>) {
    let shared = Arc::new(Shared {
        writes: StdMutex::new(Vec::new()),
        injector: StdMutex::new(None),
    });
    let transport = MockTransport {
        shared: Arc::clone(&shared),
        frame_rx: None,
        connected: false,
    };
    (MeshDevice::with_config_id(transport, config_id), shared)
}

/// Injects one fromRadio message into the session's inbound pump.
async fn inject(shared: &Shared, variant: proto::from_radio::PayloadVariant) {
    let message = proto::FromRadio {
        id: 0,
        payload_variant: Some(variant),
    };
    let tx = shared
        .injector
        .lock()
        .unwrap()
        .clone()
        .expect("transport connected");
    tx.send(Bytes::from(message.encode_to_vec())).await.unwrap();
}

/// Waits (bounded) for the first event matching the predicate.
async fn wait_for(sub: &mut Subscription, pred: impl Fn(&Event) -> bool) -> Event {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = sub.recv().await.expect("dispatcher closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Connects a device and walks it through the configure handshake with
/// my-node number 7.
async fn connected_device(
    config_id: u32,
) -> (MeshDevice<MockTransport>, Arc<Shared>, Subscription) {
    let (mut device, shared) = mock_device(config_id);
    let mut sub = device.subscribe();
    device.connect().await.unwrap();

    inject(
        &shared,
        proto::from_radio::PayloadVariant::MyInfo(proto::MyNodeInfo {
            my_node_num: 7,
            ..proto::MyNodeInfo::default()
        }),
    )
    .await;
    inject(
        &shared,
        proto::from_radio::PayloadVariant::ConfigCompleteId(config_id),
    )
    .await;

    wait_for(&mut sub, |e| {
        matches!(e, Event::DeviceStatus(DeviceStatus::Configured))
    })
    .await;

    (device, shared, sub)
}

/// Builds an inbound routing packet answering `request_id` with `reason`.
fn routing_packet(request_id: u32, reason: proto::routing::Error) -> proto::MeshPacket {
    let routing = proto::Routing {
        variant: Some(proto::routing::Variant::ErrorReason(reason as i32)),
    };
    proto::MeshPacket {
        from: 99,
        to: 7,
        id: 4321,
        payload_variant: Some(proto::mesh_packet::PayloadVariant::Decoded(proto::Data {
            portnum: PortNum::RoutingApp as i32,
            payload: routing.encode_to_vec(),
            request_id,
            ..proto::Data::default()
        })),
        ..proto::MeshPacket::default()
    }
}

fn epoch_now() -> u32 {
    u32::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs(),
    )
    .unwrap()
}

#[tokio::test]
async fn configure_handshake_reaches_configured() {
    let (mut device, shared) = mock_device(0x4242);
    let mut sub = device.subscribe();

    assert_eq!(device.status(), DeviceStatus::Disconnected);
    device.connect().await.unwrap();

    // Connecting kicked off the configuration request.
    let first = shared.to_radio(0);
    assert_eq!(
        first.payload_variant,
        Some(proto::to_radio::PayloadVariant::WantConfigId(0x4242))
    );

    inject(
        &shared,
        proto::from_radio::PayloadVariant::MyInfo(proto::MyNodeInfo {
            my_node_num: 7,
            ..proto::MyNodeInfo::default()
        }),
    )
    .await;
    inject(
        &shared,
        proto::from_radio::PayloadVariant::ConfigCompleteId(0x4242),
    )
    .await;

    // Status walks Connecting -> Connected -> Configuring -> Configured.
    let mut statuses = Vec::new();
    while statuses.last() != Some(&DeviceStatus::Configured) {
        if let Event::DeviceStatus(status) = wait_for(&mut sub, |e| {
            matches!(e, Event::DeviceStatus(_))
        })
        .await
        {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![
            DeviceStatus::Connecting,
            DeviceStatus::Connected,
            DeviceStatus::Configuring,
            DeviceStatus::Configured,
        ]
    );

    assert_eq!(device.my_node_info().unwrap().my_node_num, 7);
    assert_eq!(device.status(), DeviceStatus::Configured);
}

#[tokio::test]
async fn lockstep_mismatch_still_configures() {
    let (mut device, shared) = mock_device(0x4242);
    let mut sub = device.subscribe();
    device.connect().await.unwrap();

    // Firmware echoes a different id; the session logs but proceeds.
    inject(
        &shared,
        proto::from_radio::PayloadVariant::ConfigCompleteId(0xBEEF),
    )
    .await;

    wait_for(&mut sub, |e| {
        matches!(e, Event::DeviceStatus(DeviceStatus::Configured))
    })
    .await;
    assert_eq!(device.status(), DeviceStatus::Configured);
}

#[tokio::test]
async fn send_text_resolves_on_ack() {
    let (device, shared, _sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    let handle = device
        .send_text("hi", Destination::Broadcast, ChannelIndex::Primary, true)
        .await
        .unwrap();

    // Exactly one new frame; parse it back.
    assert_eq!(shared.write_count(), writes_before + 1);
    let to_radio = shared.to_radio(writes_before);
    let Some(proto::to_radio::PayloadVariant::Packet(packet)) = to_radio.payload_variant else {
        panic!("expected a mesh packet write");
    };
    assert_eq!(packet.from, 7);
    assert_eq!(packet.to, 0xFFFF_FFFF);
    assert_eq!(packet.channel, 0);
    assert!(packet.want_ack);
    assert_eq!(packet.id, handle.id());
    let Some(proto::mesh_packet::PayloadVariant::Decoded(data)) = packet.payload_variant else {
        panic!("expected a decoded payload");
    };
    assert_eq!(data.portnum, PortNum::TextMessageApp as i32);
    assert_eq!(data.payload, b"hi");

    // The radio reports successful delivery.
    inject(
        &shared,
        proto::from_radio::PayloadVariant::Packet(routing_packet(
            handle.id(),
            proto::routing::Error::None,
        )),
    )
    .await;

    let id = handle.id();
    assert_eq!(handle.wait_ack().await.unwrap(), id);
}

#[tokio::test]
async fn send_text_rejects_on_routing_error() {
    let (device, shared, _sub) = connected_device(0x4242).await;

    let handle = device
        .send_text("hi", Destination::Broadcast, ChannelIndex::Primary, true)
        .await
        .unwrap();

    inject(
        &shared,
        proto::from_radio::PayloadVariant::Packet(routing_packet(
            handle.id(),
            proto::routing::Error::Timeout,
        )),
    )
    .await;

    match handle.wait_ack().await {
        Err(Error::Routing { reason }) => assert_eq!(reason, proto::routing::Error::Timeout),
        other => panic!("expected routing error, got {other:?}"),
    }
}

#[tokio::test]
async fn oversize_payload_is_rejected_before_write() {
    let (device, shared, _sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    let result = device
        .send_packet(
            vec![0u8; 600],
            SendOptions::new(PortNum::PrivateApp).destination(Destination::Broadcast),
        )
        .await;

    match result {
        Err(Error::PayloadTooLarge { size: 600, max: 512 }) => {}
        other => panic!("expected PayloadTooLarge, got {:?}", other.map(|h| h.id())),
    }
    assert_eq!(shared.write_count(), writes_before);
}

#[tokio::test]
async fn reboot_indication_triggers_reconfigure() {
    let (device, shared, mut sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    inject(&shared, proto::from_radio::PayloadVariant::Rebooted(true)).await;

    wait_for(&mut sub, |e| {
        matches!(e, Event::DeviceStatus(DeviceStatus::Configuring))
    })
    .await;

    // A fresh wantConfigId frame goes out with the same lockstep id.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if shared.write_count() > writes_before {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "no reconfigure write");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let reconfigure = shared.to_radio(writes_before);
    assert_eq!(
        reconfigure.payload_variant,
        Some(proto::to_radio::PayloadVariant::WantConfigId(0x4242))
    );

    // And the handshake completes again.
    inject(
        &shared,
        proto::from_radio::PayloadVariant::ConfigCompleteId(0x4242),
    )
    .await;
    wait_for(&mut sub, |e| {
        matches!(e, Event::DeviceStatus(DeviceStatus::Configured))
    })
    .await;
    assert_eq!(device.status(), DeviceStatus::Configured);
}

#[tokio::test]
async fn echo_response_fires_before_transmit_completes() {
    let (device, shared, mut sub) = connected_device(0x4242).await;
    let before = epoch_now();

    let handle = device
        .send_packet(
            b"ping".to_vec(),
            SendOptions::new(PortNum::TextMessageApp)
                .destination(Destination::Broadcast)
                .echo_response(true),
        )
        .await
        .unwrap();

    // The echoed message is already buffered for subscribers when
    // send_packet returns; no further injection is needed to observe it.
    let event = wait_for(&mut sub, |e| matches!(e, Event::Message(_))).await;
    let Event::Message(meta) = event else {
        unreachable!()
    };
    assert_eq!(meta.data, "ping");
    assert_eq!(meta.id, handle.id());
    assert!(meta.rx_time >= before && meta.rx_time <= epoch_now() + 1);

    // The echo must not have acked the pending send.
    inject(
        &shared,
        proto::from_radio::PayloadVariant::Packet(routing_packet(
            handle.id(),
            proto::routing::Error::None,
        )),
    )
    .await;
    handle.wait_ack().await.unwrap();
}

#[tokio::test]
async fn transmit_order_matches_send_order() {
    let (device, shared, _sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        let handle = device
            .send_text(text, Destination::Broadcast, ChannelIndex::Primary, false)
            .await
            .unwrap();
        ids.push(handle.id());
    }

    let written_ids: Vec<u32> = (0..3)
        .map(|i| {
            let Some(proto::to_radio::PayloadVariant::Packet(packet)) =
                shared.to_radio(writes_before + i).payload_variant
            else {
                panic!("expected a mesh packet write");
            };
            packet.id
        })
        .collect();
    assert_eq!(written_ids, ids);
}

#[tokio::test]
async fn local_destination_resolves_to_my_node() {
    let (device, shared, _sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    device
        .send_text("to self", Destination::Local, ChannelIndex::Primary, false)
        .await
        .unwrap();

    let Some(proto::to_radio::PayloadVariant::Packet(packet)) =
        shared.to_radio(writes_before).payload_variant
    else {
        panic!("expected a mesh packet write");
    };
    assert_eq!(packet.to, 7);
}

#[tokio::test]
async fn set_config_opens_edit_transaction_once() {
    let (device, shared, mut sub) = connected_device(0x4242).await;
    let writes_before = shared.write_count();

    let lora = proto::Config {
        payload_variant: Some(proto::config::PayloadVariant::Lora(
            proto::config::LoraConfig::default(),
        )),
    };
    device.set_config(lora.clone()).await.unwrap();

    wait_for(&mut sub, |e| matches!(e, Event::PendingSettingsChanged(true))).await;

    // First write is the implicit beginEditSettings, second the setConfig.
    assert_eq!(shared.write_count(), writes_before + 2);
    let admin = |index: usize| -> proto::AdminMessage {
        let Some(proto::to_radio::PayloadVariant::Packet(packet)) =
            shared.to_radio(index).payload_variant
        else {
            panic!("expected a mesh packet write");
        };
        let Some(proto::mesh_packet::PayloadVariant::Decoded(data)) = packet.payload_variant
        else {
            panic!("expected a decoded payload");
        };
        assert_eq!(data.portnum, PortNum::AdminApp as i32);
        proto::AdminMessage::decode(data.payload.as_slice()).unwrap()
    };
    assert_eq!(
        admin(writes_before).payload_variant,
        Some(proto::admin_message::PayloadVariant::BeginEditSettings(true))
    );
    assert_eq!(
        admin(writes_before + 1).payload_variant,
        Some(proto::admin_message::PayloadVariant::SetConfig(lora))
    );

    // A second write in the same dirty period does not re-open.
    device
        .set_config(proto::Config {
            payload_variant: Some(proto::config::PayloadVariant::Device(
                proto::config::DeviceConfig::default(),
            )),
        })
        .await
        .unwrap();
    assert_eq!(shared.write_count(), writes_before + 3);

    // Committing closes the transaction and re-arms the coupling.
    device.commit_edit_settings().await.unwrap();
    wait_for(&mut sub, |e| {
        matches!(e, Event::PendingSettingsChanged(false))
    })
    .await;
}

#[tokio::test]
async fn admin_response_reroutes_to_config_event() {
    let (_device, shared, mut sub) = connected_device(0x4242).await;

    let config = proto::Config {
        payload_variant: Some(proto::config::PayloadVariant::Device(
            proto::config::DeviceConfig {
                role: 1,
                ..proto::config::DeviceConfig::default()
            },
        )),
    };
    let admin = proto::AdminMessage {
        payload_variant: Some(proto::admin_message::PayloadVariant::GetConfigResponse(
            config.clone(),
        )),
    };
    let packet = proto::MeshPacket {
        from: 7,
        to: 7,
        id: 100,
        payload_variant: Some(proto::mesh_packet::PayloadVariant::Decoded(proto::Data {
            portnum: PortNum::AdminApp as i32,
            payload: admin.encode_to_vec(),
            ..proto::Data::default()
        })),
        ..proto::MeshPacket::default()
    };
    inject(&shared, proto::from_radio::PayloadVariant::Packet(packet)).await;

    let event = wait_for(&mut sub, |e| matches!(e, Event::Config(_))).await;
    let Event::Config(received) = event else {
        unreachable!()
    };
    assert_eq!(*received, config);
}

#[tokio::test]
async fn node_info_synthesizes_user_and_position_events() {
    let (_device, shared, mut sub) = connected_device(0x4242).await;

    let node = proto::NodeInfo {
        num: 55,
        user: Some(proto::User {
            id: "!0000dead".into(),
            long_name: "Base Camp".into(),
            short_name: "BC".into(),
            ..proto::User::default()
        }),
        position: Some(proto::Position {
            latitude_i: 471_234_567,
            longitude_i: -122_345_678,
            ..proto::Position::default()
        }),
        ..proto::NodeInfo::default()
    };
    inject(&shared, proto::from_radio::PayloadVariant::NodeInfo(node)).await;

    let position = wait_for(&mut sub, |e| matches!(e, Event::Position(_))).await;
    let Event::Position(meta) = position else {
        unreachable!()
    };
    assert_eq!(meta.from, 55);
    assert_eq!(meta.to, 55);
    assert_eq!(meta.data.latitude_i, 471_234_567);

    let user = wait_for(&mut sub, |e| matches!(e, Event::User(_))).await;
    let Event::User(meta) = user else { unreachable!() };
    assert_eq!(meta.from, 55);
    assert_eq!(meta.data.long_name, "Base Camp");
}

#[tokio::test]
async fn foreign_packet_fires_mesh_heartbeat() {
    let (_device, shared, mut sub) = connected_device(0x4242).await;

    let packet = proto::MeshPacket {
        from: 99,
        to: 0xFFFF_FFFF,
        id: 5,
        payload_variant: Some(proto::mesh_packet::PayloadVariant::Decoded(proto::Data {
            portnum: PortNum::TextMessageApp as i32,
            payload: b"anyone out there".to_vec(),
            ..proto::Data::default()
        })),
        ..proto::MeshPacket::default()
    };
    inject(&shared, proto::from_radio::PayloadVariant::Packet(packet)).await;

    wait_for(&mut sub, |e| matches!(e, Event::MeshHeartbeat(_))).await;
    let message = wait_for(&mut sub, |e| matches!(e, Event::Message(_))).await;
    let Event::Message(meta) = message else {
        unreachable!()
    };
    assert_eq!(meta.data, "anyone out there");
    assert!(matches!(meta.kind, meshtastic_client::PacketKind::Broadcast));
}

#[tokio::test]
async fn disconnect_cancels_pending_sends() {
    let (mut device, _shared, mut sub) = connected_device(0x4242).await;

    let handle = device
        .send_text("doomed", Destination::Broadcast, ChannelIndex::Primary, true)
        .await
        .unwrap();

    device.disconnect().await.unwrap();

    assert!(matches!(handle.wait_ack().await, Err(Error::Cancelled)));
    wait_for(&mut sub, |e| {
        matches!(e, Event::DeviceStatus(DeviceStatus::Disconnected))
    })
    .await;
    assert_eq!(device.status(), DeviceStatus::Disconnected);
}

#[tokio::test]
async fn xmodem_send_file_completes_against_acking_peer() {
    let (device, shared, _sub) = connected_device(0x4242).await;
    let data: Vec<u8> = (0..300u32).map(|i| (i % 256) as u8).collect();

    let send = device.send_file(&data);
    tokio::pin!(send);

    // Play the radio's side: ack every block and the final EOT.
    let mut acked = 0usize;
    loop {
        tokio::select! {
            result = &mut send => {
                result.unwrap();
                break;
            }
            () = tokio::time::sleep(Duration::from_millis(5)) => {
                while acked < shared.write_count() {
                    let to_radio = shared.to_radio(acked);
                    acked += 1;
                    let Some(proto::to_radio::PayloadVariant::XmodemPacket(frame)) =
                        to_radio.payload_variant
                    else {
                        continue;
                    };
                    let control = proto::xmodem::Control::try_from(frame.control).unwrap();
                    if matches!(
                        control,
                        proto::xmodem::Control::Soh | proto::xmodem::Control::Eot
                    ) {
                        inject(
                            &shared,
                            proto::from_radio::PayloadVariant::XmodemPacket(proto::XModem {
                                control: proto::xmodem::Control::Ack as i32,
                                seq: frame.seq,
                                ..proto::XModem::default()
                            }),
                        )
                        .await;
                    }
                }
            }
        }
    }

    // 300 bytes -> three 128-byte-or-less blocks plus the EOT.
    let xmodem_frames: usize = (0..shared.write_count())
        .filter(|&i| {
            matches!(
                shared.to_radio(i).payload_variant,
                Some(proto::to_radio::PayloadVariant::XmodemPacket(_))
            )
        })
        .count();
    assert_eq!(xmodem_frames, 4);
}
