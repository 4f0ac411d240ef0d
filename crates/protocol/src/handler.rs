//! Session handler capability interface
//!
//! One method per packet kind; each returns whether the handler consumed
//! the packet. The default implementation declines everything, so a
//! handler only overrides the packets it interprets and every other kind
//! falls through to the caller's default behavior (pass-through
//! forwarding to the other side).

use crate::packet::Packet;
use crate::packets::config::{ClientSettingsPacket, FinishConfigurationPacket};
use crate::packets::handshake::HandshakePacket;
use crate::packets::login::{
    DisconnectPacket, EncryptionRequestPacket, EncryptionResponsePacket, LoginAcknowledgedPacket,
    LoginPluginMessagePacket, LoginPluginResponsePacket, LoginSuccessPacket, ServerLoginPacket,
    SetCompressionPacket,
};
use crate::packets::play::{
    KeepAlivePacket, PluginMessagePacket, ReconfigureAcknowledgedPacket,
    StartReconfigurationPacket,
};
use crate::packets::status::{StatusPingPacket, StatusRequestPacket, StatusResponsePacket};
use crate::state::{Direction, Phase};

/// Phase-scoped session logic for one side of one connection.
///
/// Exactly one handler is active per connection side at a time,
/// addressed by the current [`Phase`]. Handlers never mutate the packet
/// they receive; any mutation happens in handler-owned state.
///
/// Beyond the per-packet methods there are two engine hooks:
/// [`take_phase_transition`](Self::take_phase_transition) lets a handler
/// request the next phase after completing its step of the protocol, and
/// [`drain_outbox`](Self::drain_outbox) yields packets the handler wants
/// encoded and sent (e.g. a locally-answered status response).
#[allow(unused_variables)]
pub trait SessionHandler: Send {
    fn handle_handshake(&mut self, packet: &HandshakePacket) -> bool {
        false
    }

    fn handle_status_request(&mut self, packet: &StatusRequestPacket) -> bool {
        false
    }

    fn handle_status_response(&mut self, packet: &StatusResponsePacket) -> bool {
        false
    }

    fn handle_status_ping(&mut self, packet: &StatusPingPacket) -> bool {
        false
    }

    fn handle_server_login(&mut self, packet: &ServerLoginPacket) -> bool {
        false
    }

    fn handle_encryption_request(&mut self, packet: &EncryptionRequestPacket) -> bool {
        false
    }

    fn handle_encryption_response(&mut self, packet: &EncryptionResponsePacket) -> bool {
        false
    }

    fn handle_login_success(&mut self, packet: &LoginSuccessPacket) -> bool {
        false
    }

    fn handle_set_compression(&mut self, packet: &SetCompressionPacket) -> bool {
        false
    }

    fn handle_login_plugin_message(&mut self, packet: &LoginPluginMessagePacket) -> bool {
        false
    }

    fn handle_login_plugin_response(&mut self, packet: &LoginPluginResponsePacket) -> bool {
        false
    }

    fn handle_login_acknowledged(&mut self, packet: &LoginAcknowledgedPacket) -> bool {
        false
    }

    fn handle_disconnect(&mut self, packet: &DisconnectPacket) -> bool {
        false
    }

    fn handle_client_settings(&mut self, packet: &ClientSettingsPacket) -> bool {
        false
    }

    fn handle_plugin_message(&mut self, packet: &PluginMessagePacket) -> bool {
        false
    }

    fn handle_keep_alive(&mut self, packet: &KeepAlivePacket) -> bool {
        false
    }

    fn handle_finish_configuration(&mut self, packet: &FinishConfigurationPacket) -> bool {
        false
    }

    fn handle_start_reconfiguration(&mut self, packet: &StartReconfigurationPacket) -> bool {
        false
    }

    fn handle_reconfigure_acknowledged(&mut self, packet: &ReconfigureAcknowledgedPacket) -> bool {
        false
    }

    /// Protocol version the handler negotiated, if any.
    ///
    /// Only the handshake handler ever reports one; the engine adopts it
    /// before applying any phase transition from the same packet.
    fn take_version_selection(&mut self) -> Option<crate::version::ProtocolVersion> {
        None
    }

    /// Phase the handler wants the session to move to, if any.
    ///
    /// Polled by the engine after each dispatched packet; the request is
    /// cleared by the call. Transitions are validated by the engine, not
    /// here.
    fn take_phase_transition(&mut self) -> Option<Phase> {
        None
    }

    /// Packets the handler wants sent, each tagged with the direction it
    /// should travel. Drained by the engine after dispatch.
    fn drain_outbox(&mut self) -> Vec<(Direction, Packet)> {
        Vec::new()
    }
}

/// Handler that declines every packet, yielding pure pass-through
/// forwarding for both directions of a connection
#[derive(Debug, Default)]
pub struct PassthroughHandler;

impl SessionHandler for PassthroughHandler {}
