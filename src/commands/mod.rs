//! Administrative operations.
//!
//! Every admin request follows the same shape: build an [`AdminMessage`]
//! variant, serialize it, and send it as a mesh packet on the ADMIN port —
//! to the local node on the primary channel, or to a remote node on the
//! admin channel. One named method per admin variant.

use std::sync::atomic::Ordering;

use prost::Message;

use crate::client::{MeshDevice, SendOptions};
use crate::error::Result;
use crate::event::Event;
use crate::proto::{self, admin_message::PayloadVariant, AdminMessage, PortNum};
use crate::protocol::SendHandle;
use crate::transport::Transport;
use crate::types::{ChannelIndex, Destination, DeviceStatus};

impl<T: Transport + 'static> MeshDevice<T> {
    /// Sends an admin message. Remote destinations use the admin channel.
    async fn send_admin(
        &self,
        variant: PayloadVariant,
        destination: Destination,
        want_response: bool,
    ) -> Result<SendHandle> {
        let channel = match destination {
            Destination::Node(_) => ChannelIndex::Admin,
            Destination::Broadcast | Destination::Local => ChannelIndex::Primary,
        };
        let message = AdminMessage {
            payload_variant: Some(variant),
        };
        let options = SendOptions::new(PortNum::AdminApp)
            .destination(destination)
            .channel(channel)
            .want_ack(true)
            .want_response(want_response);
        self.state
            .send_packet(message.encode_to_vec(), options)
            .await
    }

    /// Opens an edit transaction if none is pending yet.
    async fn begin_edit_if_needed(&self) -> Result<()> {
        if !self.state.edit_pending.swap(true, Ordering::SeqCst) {
            if let Err(e) = self
                .send_admin(PayloadVariant::BeginEditSettings(true), Destination::Local, false)
                .await
            {
                self.state.edit_pending.store(false, Ordering::SeqCst);
                return Err(e);
            }
            self.state
                .dispatcher
                .dispatch(Event::PendingSettingsChanged(true));
        }
        Ok(())
    }

    // ==================== Settings Transactions ====================

    /// Tells the radio to buffer subsequent settings writes instead of
    /// committing each one individually.
    pub async fn begin_edit_settings(&self) -> Result<()> {
        self.begin_edit_if_needed().await
    }

    /// Commits all buffered settings writes and closes the transaction.
    pub async fn commit_edit_settings(&self) -> Result<SendHandle> {
        let handle = self
            .send_admin(PayloadVariant::CommitEditSettings(true), Destination::Local, false)
            .await?;
        self.state.edit_pending.store(false, Ordering::SeqCst);
        self.state
            .dispatcher
            .dispatch(Event::PendingSettingsChanged(false));
        Ok(handle)
    }

    // ==================== Configuration ====================

    /// Writes a configuration section. The first write in a dirty period
    /// automatically opens an edit transaction; call
    /// [`commit_edit_settings`](Self::commit_edit_settings) to apply.
    pub async fn set_config(&self, config: proto::Config) -> Result<SendHandle> {
        self.begin_edit_if_needed().await?;
        self.send_admin(PayloadVariant::SetConfig(config), Destination::Local, false)
            .await
    }

    /// Writes a module configuration section; transactional like
    /// [`set_config`](Self::set_config).
    pub async fn set_module_config(&self, config: proto::ModuleConfig) -> Result<SendHandle> {
        self.begin_edit_if_needed().await?;
        self.send_admin(
            PayloadVariant::SetModuleConfig(config),
            Destination::Local,
            false,
        )
        .await
    }

    /// Requests a configuration section; the response arrives as an
    /// [`Event::Config`].
    pub async fn get_config(
        &self,
        config_type: proto::admin_message::ConfigType,
    ) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::GetConfigRequest(config_type as i32),
            Destination::Local,
            true,
        )
        .await
    }

    /// Requests a module configuration section; the response arrives as an
    /// [`Event::ModuleConfig`].
    pub async fn get_module_config(
        &self,
        config_type: proto::admin_message::ModuleConfigType,
    ) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::GetModuleConfigRequest(config_type as i32),
            Destination::Local,
            true,
        )
        .await
    }

    // ==================== Channels ====================

    /// Writes a channel slot.
    pub async fn set_channel(&self, channel: proto::Channel) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::SetChannel(channel), Destination::Local, false)
            .await
    }

    /// Requests a channel slot; the response arrives as an
    /// [`Event::Channel`].
    pub async fn get_channel(&self, index: u32) -> Result<SendHandle> {
        // The request field is the channel index plus one; zero means
        // "no request".
        self.send_admin(
            PayloadVariant::GetChannelRequest(index + 1),
            Destination::Local,
            true,
        )
        .await
    }

    /// Disables a channel slot by writing it back empty.
    pub async fn clear_channel(&self, index: u32) -> Result<SendHandle> {
        let channel = proto::Channel {
            index: i32::try_from(index).unwrap_or(0),
            settings: None,
            role: proto::channel::Role::Disabled as i32,
        };
        self.set_channel(channel).await
    }

    // ==================== Owner and Position ====================

    /// Writes the node owner identity.
    pub async fn set_owner(&self, owner: proto::User) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::SetOwner(owner), Destination::Local, false)
            .await
    }

    /// Requests the node owner identity; the response arrives as an
    /// [`Event::Owner`].
    pub async fn get_owner(&self) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::GetOwnerRequest(true), Destination::Local, true)
            .await
    }

    /// Pins the radio to a fixed position.
    pub async fn set_position(&self, position: proto::Position) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::SetFixedPosition(position),
            Destination::Local,
            false,
        )
        .await
    }

    /// Clears a previously set fixed position.
    pub async fn remove_fixed_position(&self) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::RemoveFixedPosition(true),
            Destination::Local,
            false,
        )
        .await
    }

    /// Writes the canned messages list (pipe-separated).
    pub async fn set_canned_messages(&self, messages: &str) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::SetCannedMessageModuleMessages(messages.to_owned()),
            Destination::Local,
            false,
        )
        .await
    }

    // ==================== Metadata ====================

    /// Requests device metadata from a node; the response arrives as an
    /// [`Event::DeviceMetadata`].
    pub async fn get_metadata(&self, node_num: u32) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::GetDeviceMetadataRequest(true),
            Destination::Node(node_num),
            true,
        )
        .await
    }

    // ==================== Node Database ====================

    /// Wipes the radio's node database.
    pub async fn reset_nodes(&self) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::NodedbReset(1), Destination::Local, false)
            .await
    }

    /// Removes a single node from the radio's node database.
    pub async fn remove_node_by_num(&self, node_num: u32) -> Result<SendHandle> {
        self.send_admin(
            PayloadVariant::RemoveByNodenum(node_num),
            Destination::Local,
            false,
        )
        .await
    }

    // ==================== Power and Maintenance ====================

    /// Shuts the radio down after the given delay.
    pub async fn shutdown(&self, seconds: i32) -> Result<SendHandle> {
        if seconds <= 2 {
            tracing::info!("shutting down radio now");
        } else {
            tracing::info!("shutting down radio in {seconds}s");
        }
        let handle = self
            .send_admin(
                PayloadVariant::ShutdownSeconds(seconds),
                Destination::Local,
                false,
            )
            .await?;
        self.state.set_status(DeviceStatus::Restarting);
        Ok(handle)
    }

    /// Reboots the radio after the given delay. A `rebooted` indication on
    /// reconnect triggers automatic reconfiguration.
    pub async fn reboot(&self, seconds: i32) -> Result<SendHandle> {
        tracing::info!("rebooting radio in {seconds}s");
        let handle = self
            .send_admin(
                PayloadVariant::RebootSeconds(seconds),
                Destination::Local,
                false,
            )
            .await?;
        self.state.set_status(DeviceStatus::Restarting);
        Ok(handle)
    }

    /// Reboots the radio into the OTA update partition.
    pub async fn reboot_ota(&self, seconds: i32) -> Result<SendHandle> {
        tracing::info!("rebooting radio into OTA mode in {seconds}s");
        let handle = self
            .send_admin(
                PayloadVariant::RebootOtaSeconds(seconds),
                Destination::Local,
                false,
            )
            .await?;
        self.state.set_status(DeviceStatus::Restarting);
        Ok(handle)
    }

    /// Factory-resets the whole device, including the node database and
    /// keys.
    pub async fn factory_reset_device(&self) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::FactoryResetDevice(1), Destination::Local, false)
            .await
    }

    /// Factory-resets the configuration only.
    pub async fn factory_reset_config(&self) -> Result<SendHandle> {
        self.send_admin(PayloadVariant::FactoryResetConfig(1), Destination::Local, false)
            .await
    }

    /// Switches the radio into firmware-update (DFU) mode.
    pub async fn enter_dfu_mode(&self) -> Result<SendHandle> {
        let handle = self
            .send_admin(
                PayloadVariant::EnterDfuModeRequest(true),
                Destination::Local,
                false,
            )
            .await?;
        self.state.set_status(DeviceStatus::FirmwareUpdate);
        Ok(handle)
    }

    // ==================== Mesh Queries ====================

    /// Traces the route to a node; the reply arrives as an
    /// [`Event::Traceroute`].
    pub async fn trace_route(&self, destination: Destination) -> Result<SendHandle> {
        let route = proto::RouteDiscovery::default();
        let options = SendOptions::new(PortNum::TracerouteApp)
            .destination(destination)
            .want_ack(true)
            .want_response(true);
        self.state.send_packet(route.encode_to_vec(), options).await
    }

    /// Asks a node for its position; the reply arrives as an
    /// [`Event::Position`].
    pub async fn request_position(&self, destination: Destination) -> Result<SendHandle> {
        let options = SendOptions::new(PortNum::PositionApp)
            .destination(destination)
            .want_ack(true)
            .want_response(true);
        self.state
            .send_packet(proto::Position::default().encode_to_vec(), options)
            .await
    }
}
