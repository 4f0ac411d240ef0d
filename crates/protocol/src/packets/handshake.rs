//! Handshake phase packet

use bytes::{Buf, BufMut, BytesMut};
use waypoint_core::Result;

use crate::codec::{read_string, read_varint, write_string, write_varint};
use crate::packet::PacketCodec;
use crate::state::{Direction, Phase};
use crate::version::ProtocolVersion;

/// Maximum codepoints in the server address field
const SERVER_ADDRESS_MAX: usize = 255;

/// Opening packet of every connection
///
/// # Purpose
/// Announces the client's protocol version and which sub-protocol the
/// connection continues with. This is the only packet whose layout is
/// identical in every protocol version, since it is what version
/// negotiation itself rides on.
///
/// # Packet Structure
/// ```text
/// Packet ID: 0x00 (serverbound, handshake)
/// {
///     VarInt  protocol_version;  // client's wire revision number
///     String  server_address;    // hostname the client dialed (≤255)
///     u16     server_port;
///     VarInt  next_phase;        // 1 = status, 2 = login, 3 = transfer
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePacket {
    /// Raw wire revision number; resolved against the catalog with
    /// [`ProtocolVersion::from_wire_number`]
    pub protocol_version: i32,

    /// Hostname the client dialed, as typed in the server list.
    /// Forge clients and some proxies append marker suffixes here.
    pub server_address: String,

    /// Port the client dialed
    pub server_port: u16,

    /// Requested next phase, raw wire value
    pub next_phase: i32,
}

impl HandshakePacket {
    pub fn new(protocol_version: i32, server_address: String, server_port: u16, next_phase: i32) -> Self {
        Self {
            protocol_version,
            server_address,
            server_port,
            next_phase,
        }
    }

    /// Catalog entry for the announced wire revision, if known
    pub fn known_version(&self) -> Option<ProtocolVersion> {
        ProtocolVersion::from_wire_number(self.protocol_version)
    }

    /// Phase the connection continues with, if the wire value is one the
    /// proxy routes (the 1.20.5 transfer intent maps to login)
    pub fn requested_phase(&self) -> Option<Phase> {
        match self.next_phase {
            1 => Some(Phase::Status),
            2 | 3 => Some(Phase::Login),
            _ => None,
        }
    }
}

impl PacketCodec for HandshakePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        let protocol_version = read_varint(buf)?;
        let server_address = read_string(buf, SERVER_ADDRESS_MAX)?;
        let server_port = {
            if buf.remaining() < 2 {
                return Err(waypoint_core::WaypointError::Framing(
                    "Truncated handshake port".into(),
                ));
            }
            buf.get_u16()
        };
        let next_phase = read_varint(buf)?;

        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_phase,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        write_varint(buf, self.protocol_version);
        write_string(buf, &self.server_address, SERVER_ADDRESS_MAX)?;
        buf.put_u16(self.server_port);
        write_varint(buf, self.next_phase);
        Ok(())
    }

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        // 1-byte version + empty address prefix + port + 1-byte intent
        5
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        // 5-byte version + (prefix + 4 * 255 address bytes) + port + 5-byte intent
        Some(5 + 2 + SERVER_ADDRESS_MAX * 4 + 2 + 5)
    }
}
