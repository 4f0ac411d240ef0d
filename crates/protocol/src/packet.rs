//! Packet type system: per-version codec contract and double dispatch
//!
//! Every wire message kind is one variant of [`Packet`], a flat
//! enumeration so dispatch stays exhaustiveness-checked at compile time.
//! [`PacketKind`] is the payload-free discriminant the registry maps
//! numeric ids to and from.

use bytes::BytesMut;
use waypoint_core::Result;

use crate::handler::SessionHandler;
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
use crate::state::Direction;
use crate::version::ProtocolVersion;

/// Per-version encode/decode contract every packet type implements.
///
/// `decode` reads fields in wire order, with version branches evaluated
/// newest-compatible to oldest exactly as the packet's wire documentation
/// lists them. `encode` is symmetric and fails (never writes garbage)
/// when a required field was not populated.
///
/// The length hints let the transport sanity-check a frame before
/// decoding, a cheap first line of defense against hostile input. The
/// default is "no constraint".
pub trait PacketCodec: Sized {
    fn decode(buf: &mut BytesMut, direction: Direction, version: ProtocolVersion) -> Result<Self>;

    fn encode(&self, buf: &mut BytesMut, direction: Direction, version: ProtocolVersion)
        -> Result<()>;

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        0
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        None
    }
}

macro_rules! packet_set {
    ($( $variant:ident => $ty:ty, $handle:ident; )+) => {
        /// A decoded wire message, one variant per packet kind
        #[derive(Debug, Clone, PartialEq)]
        pub enum Packet {
            $( $variant($ty), )+
        }

        /// Payload-free packet discriminant used as the registry key
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PacketKind {
            $( $variant, )+
        }

        impl Packet {
            /// The discriminant of this packet
            pub fn kind(&self) -> PacketKind {
                match self {
                    $( Packet::$variant(_) => PacketKind::$variant, )+
                }
            }

            /// Encode this packet's payload (without the leading id)
            pub fn encode(
                &self,
                buf: &mut BytesMut,
                direction: Direction,
                version: ProtocolVersion,
            ) -> Result<()> {
                match self {
                    $( Packet::$variant(p) => p.encode(buf, direction, version), )+
                }
            }

            /// Route this packet to the handler method for its variant.
            ///
            /// Returns whether the handler consumed the packet; a decline
            /// lets the caller apply default behavior (pass-through
            /// forwarding). The packet itself is never mutated here.
            pub fn handle(&self, handler: &mut dyn SessionHandler) -> bool {
                match self {
                    $( Packet::$variant(p) => handler.$handle(p), )+
                }
            }
        }

        impl PacketKind {
            /// Decode a payload into the packet type behind this kind
            pub fn decode(
                self,
                buf: &mut BytesMut,
                direction: Direction,
                version: ProtocolVersion,
            ) -> Result<Packet> {
                match self {
                    $( PacketKind::$variant => {
                        <$ty>::decode(buf, direction, version).map(Packet::$variant)
                    } )+
                }
            }

            /// Minimum payload length the transport should accept
            pub fn expected_min_length(
                self,
                direction: Direction,
                version: ProtocolVersion,
            ) -> usize {
                match self {
                    $( PacketKind::$variant => {
                        <$ty>::expected_min_length(direction, version)
                    } )+
                }
            }

            /// Maximum payload length the transport should accept,
            /// `None` when unbounded
            pub fn expected_max_length(
                self,
                direction: Direction,
                version: ProtocolVersion,
            ) -> Option<usize> {
                match self {
                    $( PacketKind::$variant => {
                        <$ty>::expected_max_length(direction, version)
                    } )+
                }
            }
        }
    };
}

packet_set! {
    Handshake => HandshakePacket, handle_handshake;
    StatusRequest => StatusRequestPacket, handle_status_request;
    StatusResponse => StatusResponsePacket, handle_status_response;
    StatusPing => StatusPingPacket, handle_status_ping;
    ServerLogin => ServerLoginPacket, handle_server_login;
    EncryptionRequest => EncryptionRequestPacket, handle_encryption_request;
    EncryptionResponse => EncryptionResponsePacket, handle_encryption_response;
    LoginSuccess => LoginSuccessPacket, handle_login_success;
    SetCompression => SetCompressionPacket, handle_set_compression;
    LoginPluginMessage => LoginPluginMessagePacket, handle_login_plugin_message;
    LoginPluginResponse => LoginPluginResponsePacket, handle_login_plugin_response;
    LoginAcknowledged => LoginAcknowledgedPacket, handle_login_acknowledged;
    Disconnect => DisconnectPacket, handle_disconnect;
    ClientSettings => ClientSettingsPacket, handle_client_settings;
    PluginMessage => PluginMessagePacket, handle_plugin_message;
    KeepAlive => KeepAlivePacket, handle_keep_alive;
    FinishConfiguration => FinishConfigurationPacket, handle_finish_configuration;
    StartReconfiguration => StartReconfigurationPacket, handle_start_reconfiguration;
    ReconfigureAcknowledged => ReconfigureAcknowledgedPacket, handle_reconfigure_acknowledged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::SessionHandler;

    struct CountingHandler {
        keep_alives: u32,
    }

    impl SessionHandler for CountingHandler {
        fn handle_keep_alive(&mut self, _packet: &KeepAlivePacket) -> bool {
            self.keep_alives += 1;
            true
        }
    }

    #[test]
    fn test_dispatch_reaches_matching_method() {
        let mut handler = CountingHandler { keep_alives: 0 };
        let packet = Packet::KeepAlive(KeepAlivePacket::new(7));

        assert!(packet.handle(&mut handler));
        assert_eq!(handler.keep_alives, 1);
    }

    #[test]
    fn test_dispatch_defaults_decline() {
        let mut handler = CountingHandler { keep_alives: 0 };
        let packet = Packet::StatusRequest(StatusRequestPacket);

        // No override for status request, so the default declines
        assert!(!packet.handle(&mut handler));
        assert_eq!(handler.keep_alives, 0);
    }

    #[test]
    fn test_kind_matches_variant() {
        let packet = Packet::KeepAlive(KeepAlivePacket::new(1));
        assert_eq!(packet.kind(), PacketKind::KeepAlive);
    }
}
