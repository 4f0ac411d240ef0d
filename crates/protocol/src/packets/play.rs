//! Play phase packets the proxy interprets
//!
//! The proxy only decodes the handful of play packets it needs for
//! liveness tracking, channel messaging and reconfiguration; everything
//! else in the play phase is opaque game traffic.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use waypoint_core::{Result, WaypointError};

use crate::codec::{read_remaining, read_string, read_varint, write_string, write_varint};
use crate::packet::PacketCodec;
use crate::state::Direction;
use crate::version::ProtocolVersion;

/// Maximum codepoints in a plugin channel identifier
const CHANNEL_MAX: usize = 256;

// ============================================================================
// KEEP ALIVE
// ============================================================================

/// Liveness probe, echoed by the receiving side
///
/// # Purpose
/// The payload width changed twice, making this the smallest packet with
/// real bracket churn:
///
/// ```text
/// before 1.8:   i32 payload
/// 1.8–1.12.1:   VarInt payload
/// 1.12.2+:      i64 payload
/// ```
///
/// The length hints track the bracket, so the transport rejects frames
/// of the wrong width before decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlivePacket {
    pub payload: i64,
}

impl KeepAlivePacket {
    pub fn new(payload: i64) -> Self {
        Self { payload }
    }
}

impl PacketCodec for KeepAlivePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        let payload = if version.no_less_than(ProtocolVersion::V1_12_2) {
            if buf.remaining() < 8 {
                return Err(WaypointError::Framing("Truncated keep-alive".into()));
            }
            buf.get_i64()
        } else if version.no_less_than(ProtocolVersion::V1_8) {
            i64::from(read_varint(buf)?)
        } else {
            if buf.remaining() < 4 {
                return Err(WaypointError::Framing("Truncated keep-alive".into()));
            }
            i64::from(buf.get_i32())
        };
        Ok(Self { payload })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        if version.no_less_than(ProtocolVersion::V1_12_2) {
            buf.put_i64(self.payload);
        } else if version.no_less_than(ProtocolVersion::V1_8) {
            write_varint(buf, self.payload as i32);
        } else {
            buf.put_i32(self.payload as i32);
        }
        Ok(())
    }

    fn expected_min_length(_direction: Direction, version: ProtocolVersion) -> usize {
        if version.no_less_than(ProtocolVersion::V1_12_2) {
            8
        } else if version.no_less_than(ProtocolVersion::V1_8) {
            1
        } else {
            4
        }
    }

    fn expected_max_length(_direction: Direction, version: ProtocolVersion) -> Option<usize> {
        Some(if version.no_less_than(ProtocolVersion::V1_12_2) {
            8
        } else if version.no_less_than(ProtocolVersion::V1_8) {
            5
        } else {
            4
        })
    }
}

// ============================================================================
// PLUGIN MESSAGE
// ============================================================================

/// Custom-channel payload carried inside the game protocol
///
/// The payload is opaque to the proxy and runs to the end of the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMessagePacket {
    pub channel: String,
    pub data: Bytes,
}

impl PluginMessagePacket {
    pub fn new(channel: String, data: Bytes) -> Self {
        Self { channel, data }
    }
}

impl PacketCodec for PluginMessagePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            channel: read_string(buf, CHANNEL_MAX)?,
            data: read_remaining(buf),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        write_string(buf, &self.channel, CHANNEL_MAX)?;
        buf.put_slice(&self.data);
        Ok(())
    }
}

// ============================================================================
// RECONFIGURATION MARKERS (1.20.2+)
// ============================================================================

/// Server order to re-enter the configuration phase. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartReconfigurationPacket;

impl PacketCodec for StartReconfigurationPacket {
    fn decode(_buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self)
    }

    fn encode(&self, _buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        Ok(())
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        Some(0)
    }
}

/// Client acknowledgement of a reconfiguration order. Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconfigureAcknowledgedPacket;

impl PacketCodec for ReconfigureAcknowledgedPacket {
    fn decode(_buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self)
    }

    fn encode(&self, _buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        Ok(())
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProtocolVersion::*;

    #[test]
    fn test_keep_alive_bracket_widths() {
        let packet = KeepAlivePacket::new(123_456);

        // (version, encoded length) per bracket
        let cases = [(V1_7_2, 4usize), (V1_8, 3), (V1_12_1, 3), (V1_12_2, 8), (V1_21, 8)];
        for (version, len) in cases {
            let mut buf = BytesMut::new();
            packet.encode(&mut buf, Direction::Serverbound, version).unwrap();
            assert_eq!(buf.len(), len, "Wrong width at {}", version);

            let decoded =
                KeepAlivePacket::decode(&mut buf, Direction::Serverbound, version).unwrap();
            assert_eq!(decoded, packet, "Failed at {}", version);
        }
    }

    #[test]
    fn test_keep_alive_length_hints_track_bracket() {
        let sb = Direction::Serverbound;
        assert_eq!(KeepAlivePacket::expected_min_length(sb, V1_7_2), 4);
        assert_eq!(KeepAlivePacket::expected_max_length(sb, V1_7_2), Some(4));
        assert_eq!(KeepAlivePacket::expected_min_length(sb, V1_8), 1);
        assert_eq!(KeepAlivePacket::expected_max_length(sb, V1_8), Some(5));
        assert_eq!(KeepAlivePacket::expected_min_length(sb, V1_12_2), 8);
        assert_eq!(KeepAlivePacket::expected_max_length(sb, V1_21), Some(8));
    }

    #[test]
    fn test_plugin_message_roundtrip() {
        let packet = PluginMessagePacket::new(
            "minecraft:brand".into(),
            Bytes::from_static(b"\x07vanilla"),
        );

        let mut buf = BytesMut::new();
        packet.encode(&mut buf, Direction::Clientbound, V1_16_4).unwrap();
        let decoded =
            PluginMessagePacket::decode(&mut buf, Direction::Clientbound, V1_16_4).unwrap();
        assert_eq!(decoded, packet);
        assert!(buf.is_empty());
    }
}
