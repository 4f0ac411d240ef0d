//! Login phase packets
//!
//! The login exchange is where most of the protocol's historical layout
//! churn is concentrated: identifier wire forms changed three times,
//! byte arrays changed prefix encoding at 1.8, and the 1.19 signing
//! experiment added (then removed) key material from both login start
//! and the encryption response.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use uuid::Uuid;
use waypoint_core::{Result, WaypointError};

use crate::codec::{
    read_bool, read_byte_array, read_byte_array_legacy, read_properties, read_remaining,
    read_string, read_uuid, read_uuid_dashed, read_uuid_int_array, read_uuid_undashed,
    read_varint, write_bool, write_byte_array, write_byte_array_legacy, write_properties,
    write_string, write_uuid, write_uuid_dashed, write_uuid_int_array, write_uuid_undashed,
    write_varint, ProfileProperty,
};
use crate::packet::PacketCodec;
use crate::state::Direction;
use crate::version::{ProtocolVersion, UuidWireFormat};

/// Maximum codepoints in a username
const USERNAME_MAX: usize = 16;

/// Maximum codepoints in the encryption server id
const SERVER_ID_MAX: usize = 20;

/// Maximum bytes for a DER-encoded public key
const PUBLIC_KEY_MAX: usize = 512;

/// Maximum bytes for a verify token or shared secret
const VERIFY_TOKEN_MAX: usize = 256;

/// Maximum bytes for a login signature
const SIGNATURE_MAX: usize = 4096;

/// Maximum codepoints in a disconnect reason document
const DISCONNECT_REASON_MAX: usize = 262_144;

/// Maximum codepoints in a plugin channel identifier
const CHANNEL_MAX: usize = 255;

// ============================================================================
// SERVER LOGIN (login start)
// ============================================================================

/// Client-announced signing key, carried only by 1.19 through 1.19.1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedKey {
    /// Key expiry, milliseconds since the epoch
    pub expiry: i64,
    /// DER-encoded public key
    pub public_key: Bytes,
    /// Key signature issued by the vendor auth service
    pub signature: Bytes,
}

/// Client request to begin login
///
/// # Packet Structure
/// ```text
/// Packet ID: 0x00 (serverbound, login)
/// {
///     String username;                       // ≤16
///     1.19–1.19.1: bool has_key, [IdentifiedKey key];
///     1.19.1–1.20:  bool has_uuid, [UUID uuid];
///     1.20.2+:      UUID uuid;               // now mandatory
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerLoginPacket {
    username: Option<String>,
    /// Signing key announced by 1.19–1.19.1 clients
    pub player_key: Option<IdentifiedKey>,
    /// Profile id the client claims; mandatory from 1.20.2
    pub holder_uuid: Option<Uuid>,
}

impl ServerLoginPacket {
    pub fn new(username: String) -> Self {
        Self {
            username: Some(username),
            player_key: None,
            holder_uuid: None,
        }
    }

    /// The username; fails if never populated
    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .ok_or(WaypointError::MissingField("username"))
    }

    pub fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }
}

impl PacketCodec for ServerLoginPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        let username = read_string(buf, USERNAME_MAX)?;

        let mut player_key = None;
        let mut holder_uuid = None;
        if version.no_less_than(ProtocolVersion::V1_19) {
            if version.no_greater_than(ProtocolVersion::V1_19_1) && read_bool(buf)? {
                let expiry = {
                    if buf.remaining() < 8 {
                        return Err(WaypointError::Framing("Truncated key expiry".into()));
                    }
                    buf.get_i64()
                };
                let public_key = read_byte_array(buf, PUBLIC_KEY_MAX)?;
                let signature = read_byte_array(buf, SIGNATURE_MAX)?;
                player_key = Some(IdentifiedKey {
                    expiry,
                    public_key,
                    signature,
                });
            }
            if version.no_less_than(ProtocolVersion::V1_19_1)
                && (version.no_less_than(ProtocolVersion::V1_20_2) || read_bool(buf)?)
            {
                holder_uuid = Some(read_uuid(buf)?);
            }
        }

        Ok(Self {
            username: Some(username),
            player_key,
            holder_uuid,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        let username = self.username()?;
        write_string(buf, username, USERNAME_MAX)?;

        if version.no_less_than(ProtocolVersion::V1_19) {
            if version.no_greater_than(ProtocolVersion::V1_19_1) {
                match &self.player_key {
                    Some(key) => {
                        write_bool(buf, true);
                        buf.put_i64(key.expiry);
                        write_byte_array(buf, &key.public_key);
                        write_byte_array(buf, &key.signature);
                    }
                    None => write_bool(buf, false),
                }
            }
            if version.no_less_than(ProtocolVersion::V1_19_1) {
                if version.no_less_than(ProtocolVersion::V1_20_2) {
                    let uuid = self
                        .holder_uuid
                        .ok_or(WaypointError::MissingField("holder_uuid"))?;
                    write_uuid(buf, uuid);
                } else {
                    match self.holder_uuid {
                        Some(uuid) => {
                            write_bool(buf, true);
                            write_uuid(buf, uuid);
                        }
                        None => write_bool(buf, false),
                    }
                }
            }
        }
        Ok(())
    }

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        // length prefix plus at least one username byte
        2
    }

    fn expected_max_length(_direction: Direction, version: ProtocolVersion) -> Option<usize> {
        let username = 1 + USERNAME_MAX * 4;
        if version.no_less_than(ProtocolVersion::V1_20_2) {
            Some(username + 16)
        } else if version.no_less_than(ProtocolVersion::V1_19) {
            // worst case: key flag + key material + uuid flag + uuid
            Some(username + 1 + 8 + 5 + PUBLIC_KEY_MAX + 5 + SIGNATURE_MAX + 1 + 16)
        } else {
            Some(username)
        }
    }
}

// ============================================================================
// ENCRYPTION REQUEST / RESPONSE
// ============================================================================

/// Server request to begin the encryption exchange
///
/// Byte arrays are VarInt-prefixed from 1.8; 1.7 used i16 prefixes.
/// 1.20.5 appended a flag telling the client whether to authenticate
/// with the vendor session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionRequestPacket {
    /// Obsolete server id, empty on modern versions
    pub server_id: String,
    /// DER-encoded RSA public key
    pub public_key: Bytes,
    /// Random nonce echoed back encrypted
    pub verify_token: Bytes,
    /// Whether the client should hit the session service (1.20.5+)
    pub should_authenticate: bool,
}

impl EncryptionRequestPacket {
    pub fn new(public_key: Bytes, verify_token: Bytes) -> Self {
        Self {
            server_id: String::new(),
            public_key,
            verify_token,
            should_authenticate: true,
        }
    }
}

impl PacketCodec for EncryptionRequestPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        let server_id = read_string(buf, SERVER_ID_MAX)?;
        let (public_key, verify_token) = if version.modern_frame_arrays() {
            (
                read_byte_array(buf, PUBLIC_KEY_MAX)?,
                read_byte_array(buf, VERIFY_TOKEN_MAX)?,
            )
        } else {
            (
                read_byte_array_legacy(buf, PUBLIC_KEY_MAX)?,
                read_byte_array_legacy(buf, VERIFY_TOKEN_MAX)?,
            )
        };
        let should_authenticate = if version.no_less_than(ProtocolVersion::V1_20_5) {
            read_bool(buf)?
        } else {
            true
        };

        Ok(Self {
            server_id,
            public_key,
            verify_token,
            should_authenticate,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        write_string(buf, &self.server_id, SERVER_ID_MAX)?;
        if version.modern_frame_arrays() {
            write_byte_array(buf, &self.public_key);
            write_byte_array(buf, &self.verify_token);
        } else {
            write_byte_array_legacy(buf, &self.public_key);
            write_byte_array_legacy(buf, &self.verify_token);
        }
        if version.no_less_than(ProtocolVersion::V1_20_5) {
            write_bool(buf, self.should_authenticate);
        }
        Ok(())
    }
}

/// Signature material sent instead of a verify token by 1.19–1.19.1
/// clients holding an identified key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltSignature {
    pub salt: i64,
    pub signature: Bytes,
}

/// Client answer to the encryption request
///
/// # Packet Structure
/// ```text
/// Packet ID: 0x01 (serverbound, login)
/// {
///     ByteArray shared_secret;     // RSA-encrypted AES key
///     1.19–1.19.1: bool has_token,
///         either ByteArray verify_token
///         or     { i64 salt; ByteArray signature; }
///     otherwise:   ByteArray verify_token;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResponsePacket {
    pub shared_secret: Bytes,
    pub verify_token: Option<Bytes>,
    pub salt_signature: Option<SaltSignature>,
}

impl EncryptionResponsePacket {
    pub fn new(shared_secret: Bytes, verify_token: Bytes) -> Self {
        Self {
            shared_secret,
            verify_token: Some(verify_token),
            salt_signature: None,
        }
    }
}

impl PacketCodec for EncryptionResponsePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        if !version.modern_frame_arrays() {
            let shared_secret = read_byte_array_legacy(buf, VERIFY_TOKEN_MAX)?;
            let verify_token = read_byte_array_legacy(buf, VERIFY_TOKEN_MAX)?;
            return Ok(Self {
                shared_secret,
                verify_token: Some(verify_token),
                salt_signature: None,
            });
        }

        let shared_secret = read_byte_array(buf, VERIFY_TOKEN_MAX)?;
        let mut verify_token = None;
        let mut salt_signature = None;
        if version.between_inclusive(ProtocolVersion::V1_19, ProtocolVersion::V1_19_1) {
            if read_bool(buf)? {
                verify_token = Some(read_byte_array(buf, VERIFY_TOKEN_MAX)?);
            } else {
                let salt = {
                    if buf.remaining() < 8 {
                        return Err(WaypointError::Framing("Truncated signature salt".into()));
                    }
                    buf.get_i64()
                };
                let signature = read_byte_array(buf, SIGNATURE_MAX)?;
                salt_signature = Some(SaltSignature { salt, signature });
            }
        } else {
            verify_token = Some(read_byte_array(buf, VERIFY_TOKEN_MAX)?);
        }

        Ok(Self {
            shared_secret,
            verify_token,
            salt_signature,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        if !version.modern_frame_arrays() {
            let token = self
                .verify_token
                .as_ref()
                .ok_or(WaypointError::MissingField("verify_token"))?;
            write_byte_array_legacy(buf, &self.shared_secret);
            write_byte_array_legacy(buf, token);
            return Ok(());
        }

        write_byte_array(buf, &self.shared_secret);
        if version.between_inclusive(ProtocolVersion::V1_19, ProtocolVersion::V1_19_1) {
            match (&self.verify_token, &self.salt_signature) {
                (Some(token), _) => {
                    write_bool(buf, true);
                    write_byte_array(buf, token);
                }
                (None, Some(sig)) => {
                    write_bool(buf, false);
                    buf.put_i64(sig.salt);
                    write_byte_array(buf, &sig.signature);
                }
                (None, None) => return Err(WaypointError::MissingField("verify_token")),
            }
        } else {
            let token = self
                .verify_token
                .as_ref()
                .ok_or(WaypointError::MissingField("verify_token"))?;
            write_byte_array(buf, token);
        }
        Ok(())
    }
}

// ============================================================================
// LOGIN SUCCESS
// ============================================================================

/// Server announcement that login completed
///
/// # Purpose
/// Carries the authenticated profile back to the client. This packet
/// crosses every identifier wire-form boundary the protocol ever had,
/// which makes it the canonical example of bracket-based decoding:
///
/// ```text
/// Packet ID: 0x02 (clientbound, login)
/// {
///     before 1.7.6:  String(32) undashed uuid
///     1.7.6–1.15.x:  String(36) dashed uuid
///     1.16–1.18.x:   [u32; 4]   uuid segments
///     1.19+:         [u64; 2]   uuid halves
///     String username;           // ≤16
///     1.19+:   VarInt count, properties;
///     =1.20.5: bool strict_error_handling;   // this one version only
/// }
/// ```
///
/// The strict-error-handling flag exists in exactly one wire revision
/// and is gated on equality, never on a range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginSuccessPacket {
    uuid: Option<Uuid>,
    username: Option<String>,
    properties: Option<Vec<ProfileProperty>>,
    /// Flag appended by wire revision 766 only; the outgoing value is a
    /// proxy configuration option
    pub strict_error_handling: bool,
}

impl LoginSuccessPacket {
    pub fn new(uuid: Uuid, username: String) -> Self {
        Self {
            uuid: Some(uuid),
            username: Some(username),
            properties: None,
            strict_error_handling: true,
        }
    }

    /// The profile identifier; fails if never populated
    pub fn uuid(&self) -> Result<Uuid> {
        self.uuid.ok_or(WaypointError::MissingField("uuid"))
    }

    pub fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = Some(uuid);
    }

    /// The profile username; fails if never populated
    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .ok_or(WaypointError::MissingField("username"))
    }

    pub fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }

    /// Signed profile properties, absent below 1.19 and when the server
    /// sent an empty list
    pub fn properties(&self) -> Option<&[ProfileProperty]> {
        self.properties.as_deref()
    }

    pub fn set_properties(&mut self, properties: Vec<ProfileProperty>) {
        self.properties = Some(properties);
    }
}

impl PacketCodec for LoginSuccessPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<Self> {
        let uuid = match UuidWireFormat::select(version) {
            UuidWireFormat::Binary => read_uuid(buf)?,
            UuidWireFormat::IntArray => read_uuid_int_array(buf)?,
            UuidWireFormat::Dashed => read_uuid_dashed(buf)?,
            UuidWireFormat::Undashed => read_uuid_undashed(buf)?,
        };
        let username = read_string(buf, USERNAME_MAX)?;

        let properties = if version.supports_signed_properties() {
            Some(read_properties(buf)?)
        } else {
            None
        };
        let strict_error_handling = if version == ProtocolVersion::V1_20_5 {
            read_bool(buf)?
        } else {
            true
        };

        Ok(Self {
            uuid: Some(uuid),
            username: Some(username),
            properties,
            strict_error_handling,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, version: ProtocolVersion) -> Result<()> {
        let uuid = self.uuid()?;
        match UuidWireFormat::select(version) {
            UuidWireFormat::Binary => write_uuid(buf, uuid),
            UuidWireFormat::IntArray => write_uuid_int_array(buf, uuid),
            UuidWireFormat::Dashed => write_uuid_dashed(buf, uuid)?,
            UuidWireFormat::Undashed => write_uuid_undashed(buf, uuid)?,
        }

        let username = self.username()?;
        write_string(buf, username, USERNAME_MAX)?;

        if version.supports_signed_properties() {
            match &self.properties {
                Some(properties) => write_properties(buf, properties)?,
                None => write_varint(buf, 0),
            }
        }
        if version == ProtocolVersion::V1_20_5 {
            write_bool(buf, self.strict_error_handling);
        }
        Ok(())
    }
}

// ============================================================================
// SET COMPRESSION
// ============================================================================

/// Server announcement of the compression threshold (1.8+)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompressionPacket {
    /// Frames of this size or larger are compressed; negative disables
    pub threshold: i32,
}

impl SetCompressionPacket {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }
}

impl PacketCodec for SetCompressionPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            threshold: read_varint(buf)?,
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        write_varint(buf, self.threshold);
        Ok(())
    }

    fn expected_min_length(_direction: Direction, _version: ProtocolVersion) -> usize {
        1
    }

    fn expected_max_length(_direction: Direction, _version: ProtocolVersion) -> Option<usize> {
        Some(5)
    }
}

// ============================================================================
// LOGIN PLUGIN MESSAGE / RESPONSE
// ============================================================================

/// Server-initiated custom negotiation during login (1.13+)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPluginMessagePacket {
    /// Message id echoed by the response
    pub message_id: i32,
    /// Channel identifier
    pub channel: String,
    /// Opaque trailing payload, everything to the end of the frame
    pub data: Bytes,
}

impl PacketCodec for LoginPluginMessagePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            message_id: read_varint(buf)?,
            channel: read_string(buf, CHANNEL_MAX)?,
            data: read_remaining(buf),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        write_varint(buf, self.message_id);
        write_string(buf, &self.channel, CHANNEL_MAX)?;
        buf.put_slice(&self.data);
        Ok(())
    }
}

/// Client answer to a login plugin message (1.13+)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPluginResponsePacket {
    pub message_id: i32,
    /// Whether the client understood the channel
    pub success: bool,
    pub data: Bytes,
}

impl PacketCodec for LoginPluginResponsePacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            message_id: read_varint(buf)?,
            success: read_bool(buf)?,
            data: read_remaining(buf),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        write_varint(buf, self.message_id);
        write_bool(buf, self.success);
        buf.put_slice(&self.data);
        Ok(())
    }
}

// ============================================================================
// LOGIN ACKNOWLEDGED
// ============================================================================

/// Client acknowledgement of login success, entering the configuration
/// phase (1.20.2+). Empty payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginAcknowledgedPacket;

impl PacketCodec for LoginAcknowledgedPacket {
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
// DISCONNECT
// ============================================================================

/// Connection termination notice with a human-readable reason
///
/// The reason is a JSON text document. Registered for the login phase on
/// every version, and for config/play only while those phases still use
/// the JSON form (revisions before 1.20.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisconnectPacket {
    reason: Option<String>,
}

impl DisconnectPacket {
    pub fn new(reason: String) -> Self {
        Self {
            reason: Some(reason),
        }
    }

    /// The reason document; fails if never populated
    pub fn reason(&self) -> Result<&str> {
        self.reason
            .as_deref()
            .ok_or(WaypointError::MissingField("reason"))
    }

    pub fn set_reason(&mut self, reason: String) {
        self.reason = Some(reason);
    }
}

impl PacketCodec for DisconnectPacket {
    fn decode(buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<Self> {
        Ok(Self {
            reason: Some(read_string(buf, DISCONNECT_REASON_MAX)?),
        })
    }

    fn encode(&self, buf: &mut BytesMut, _direction: Direction, _version: ProtocolVersion) -> Result<()> {
        let reason = self.reason()?;
        write_string(buf, reason, DISCONNECT_REASON_MAX)
    }
}
