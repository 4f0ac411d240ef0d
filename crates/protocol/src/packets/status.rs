//! Status phase packets (server list ping)

use bytes::{Buf, BufMut, BytesMut};
use waypoint_core::{Result, WaypointError};

use crate::codec::{read_string, write_string};
use crate::packet::PacketCodec;
use crate::state::Direction;
use crate::version::ProtocolVersion;

/// Maximum codepoints in the status JSON payload
const STATUS_PAYLOAD_MAX: usize = 32767;

// ============================================================================
// STATUS REQUEST
// ============================================================================

/// Client request for the server list entry
///
/// Carries no payload; a frame with any payload at all is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusRequestPacket;

impl PacketCodec for StatusRequestPacket {
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

// ============================================================================
// STATUS RESPONSE
// ============================================================================

/// Server list entry, as a JSON document
///
/// # Packet Structure
/// ```text
/// Packet ID: 0x00 (clientbound, status)
/// {
///     String status;   // JSON ping document (≤32767)
/// }
/// ```
///
/// The payload is required; encoding an instance whose payload was never
/// populated fails with a missing-field error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusResponsePacket {
    status: Option<String>,
}

impl StatusResponsePacket {
    pub fn new(status: String) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// The JSON payload; fails if never populated
    pub fn status(&self) -> Result<&str> {
        self.status
            .as_deref()
            .ok_or(WaypointError::MissingField("status"))
    }

    pub fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }
}

impl PacketCodec for StatusResponsePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            status: Some(read_string(buf, STATUS_PAYLOAD_MAX)?),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        let status = self.status()?;
        write_string(buf, status, STATUS_PAYLOAD_MAX)
    }
}

// ============================================================================
// STATUS PING / PONG
// ============================================================================

/// Latency probe, echoed verbatim by the answering side
///
/// # Packet Structure
/// ```text
/// Packet ID: 0x01 (both directions, status)
/// {
///     i64 payload;   // opaque client timestamp
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPingPacket {
    pub payload: i64,
}

impl StatusPingPacket {
    pub fn new(payload: i64) -> Self {
        Self { payload }
    }
}

impl PacketCodec for StatusPingPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        if buf.remaining() < 8 {
            return Err(WaypointError::Framing("Truncated status ping".into()));
        }
        Ok(Self {
            payload: buf.get_i64(),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        buf.put_i64(self.payload);
        Ok(())
    }

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        8
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        Some(8)
    }
}
