//! Configuration phase packets (1.20.2+)
//!
//! The configuration sub-protocol sits between login and play; the
//! client settings packet predates it and is shared with the play phase.

use bytes::{Buf, BufMut, BytesMut};
use waypoint_core::{Result, WaypointError};

use crate::codec::{read_bool, read_string, read_varint, write_bool, write_string, write_varint};
use crate::packet::PacketCodec;
use crate::state::Direction;
use crate::version::ProtocolVersion;

/// Maximum codepoints in a locale tag
const LOCALE_MAX: usize = 16;

/// Client display and chat preferences
///
/// # Packet Structure
/// ```text
/// {
///     String locale;              // e.g. "en_US", ≤16
///     i8     view_distance;
///     VarInt chat_visibility;
///     bool   chat_colors;
///     ≤1.7.6: u8 difficulty;      // removed in 1.8
///     u8     skin_parts;
///     1.9+:  VarInt main_hand;
///     1.17+: bool text_filtering;
///     1.18+: bool client_listing;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettingsPacket {
    pub locale: String,
    pub view_distance: i8,
    pub chat_visibility: i32,
    pub chat_colors: bool,
    /// Only on the wire through 1.7.6
    pub difficulty: Option<u8>,
    pub skin_parts: u8,
    /// Only on the wire from 1.9
    pub main_hand: i32,
    /// Only on the wire from 1.17
    pub text_filtering: bool,
    /// Only on the wire from 1.18
    pub client_listing: bool,
}

impl Default for ClientSettingsPacket {
    fn default() -> Self {
        Self {
            locale: "en_US".into(),
            view_distance: 10,
            chat_visibility: 0,
            chat_colors: true,
            difficulty: None,
            skin_parts: 0x7F,
            main_hand: 1,
            text_filtering: false,
            client_listing: true,
        }
    }
}

impl PacketCodec for ClientSettingsPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        let locale = read_string(buf, LOCALE_MAX)?;
        if buf.remaining() < 1 {
            return Err(WaypointError::Framing("Truncated client settings".into()));
        }
        let view_distance = buf.get_i8();
        let chat_visibility = read_varint(buf)?;
        let chat_colors = read_bool(buf)?;

        let difficulty = if version.no_greater_than(ProtocolVersion::V1_7_6) {
            if buf.remaining() < 1 {
                return Err(WaypointError::Framing("Truncated client settings".into()));
            }
            Some(buf.get_u8())
        } else {
            None
        };

        if buf.remaining() < 1 {
            return Err(WaypointError::Framing("Truncated client settings".into()));
        }
        let skin_parts = buf.get_u8();

        let mut settings = Self {
            locale,
            view_distance,
            chat_visibility,
            chat_colors,
            difficulty,
            skin_parts,
            ..Self::default()
        };
        if version.no_less_than(ProtocolVersion::V1_9) {
            settings.main_hand = read_varint(buf)?;
        }
        if version.no_less_than(ProtocolVersion::V1_17) {
            settings.text_filtering = read_bool(buf)?;
        }
        if version.no_less_than(ProtocolVersion::V1_18) {
            settings.client_listing = read_bool(buf)?;
        }

        Ok(settings)
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        write_string(buf, &self.locale, LOCALE_MAX)?;
        buf.put_i8(self.view_distance);
        write_varint(buf, self.chat_visibility);
        write_bool(buf, self.chat_colors);
        if version.no_greater_than(ProtocolVersion::V1_7_6) {
            buf.put_u8(self.difficulty.unwrap_or(0));
        }
        buf.put_u8(self.skin_parts);
        if version.no_less_than(ProtocolVersion::V1_9) {
            write_varint(buf, self.main_hand);
        }
        if version.no_less_than(ProtocolVersion::V1_17) {
            write_bool(buf, self.text_filtering);
        }
        if version.no_less_than(ProtocolVersion::V1_18) {
            write_bool(buf, self.client_listing);
        }
        Ok(())
    }

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        // empty locale prefix + view distance + visibility + colors + parts
        5
    }
}

/// Configuration boundary marker: sent clientbound to finish the phase,
/// echoed serverbound as the client's acknowledgement (1.20.2+). Empty
/// payload in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishConfigurationPacket;

impl PacketCodec for FinishConfigurationPacket {
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
