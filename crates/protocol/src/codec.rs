//! Wire primitive codecs with exact byte-level protocol compatibility
//!
//! These are the stateless building blocks every packet type decodes and
//! encodes through. All functions operate on an in-memory buffer already
//! known to contain a complete frame; they never block and never return
//! partial values. Any failure is a framing error that the caller treats
//! as fatal for the current packet.
//!
//! ## Encodings
//!
//! - VarInt / VarLong: 7 bits of payload per byte, continuation flag in
//!   the high bit, little-endian segment order. At most 5 bytes for a
//!   VarInt and 10 for a VarLong; longer continuation runs are malformed.
//! - String: VarInt byte-length prefix followed by UTF-8 bytes, bounded
//!   by a per-call-site maximum codepoint count.
//! - 128-bit identifiers: four historical representations, selected by
//!   [`UuidWireFormat`](crate::version::UuidWireFormat) at the packet
//!   layer.
//! - Profile properties: VarInt count, then (name, value, optional
//!   signature) triples in wire order.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use uuid::Uuid;
use waypoint_core::{Result, WaypointError};

/// Lower 7 bits of a varint byte
const SEGMENT_BITS: u8 = 0x7F;

/// Continuation flag of a varint byte
const CONTINUE_BIT: u8 = 0x80;

#[inline]
fn framing(msg: impl Into<String>) -> WaypointError {
    WaypointError::Framing(msg.into())
}

#[inline]
fn ensure_remaining(buf: &BytesMut, needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(framing(format!(
            "Not enough bytes for {}: need {}, have {}",
            what,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

/// Read a VarInt (at most 5 bytes)
///
/// # Format
/// Each byte carries 7 payload bits, least-significant segment first.
/// A set high bit means another byte follows.
///
/// # Errors
/// Fails with a framing error on a truncated buffer or when the
/// continuation run exceeds 5 bytes.
#[inline]
pub fn read_varint(buf: &mut BytesMut) -> Result<i32> {
    let mut value: i32 = 0;
    let mut position: u32 = 0;

    loop {
        ensure_remaining(buf, 1, "VarInt")?;
        let byte = buf.get_u8();
        value |= i32::from(byte & SEGMENT_BITS) << position;

        if byte & CONTINUE_BIT == 0 {
            break;
        }

        position += 7;
        if position >= 32 {
            return Err(framing("VarInt continuation run exceeds 5 bytes"));
        }
    }

    Ok(value)
}

/// Write a VarInt
#[inline]
pub fn write_varint(buf: &mut BytesMut, mut value: i32) {
    loop {
        let mut byte = (value & i32::from(SEGMENT_BITS)) as u8;
        value = ((value as u32) >> 7) as i32;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.put_u8(byte);

        if value == 0 {
            break;
        }
    }
}

/// Number of bytes [`write_varint`] produces for a value
#[inline]
pub const fn varint_len(value: i32) -> usize {
    let value = value as u32;
    if value == 0 {
        return 1;
    }
    let bits_needed = 32 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}

/// Read a VarLong (at most 10 bytes)
#[inline]
pub fn read_varlong(buf: &mut BytesMut) -> Result<i64> {
    let mut value: i64 = 0;
    let mut position: u32 = 0;

    loop {
        ensure_remaining(buf, 1, "VarLong")?;
        let byte = buf.get_u8();
        value |= i64::from(byte & SEGMENT_BITS) << position;

        if byte & CONTINUE_BIT == 0 {
            break;
        }

        position += 7;
        if position >= 64 {
            return Err(framing("VarLong continuation run exceeds 10 bytes"));
        }
    }

    Ok(value)
}

/// Write a VarLong
#[inline]
pub fn write_varlong(buf: &mut BytesMut, mut value: i64) {
    loop {
        let mut byte = (value & i64::from(SEGMENT_BITS)) as u8;
        value = ((value as u64) >> 7) as i64;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.put_u8(byte);

        if value == 0 {
            break;
        }
    }
}

/// Read a single byte interpreted as a boolean
#[inline]
pub fn read_bool(buf: &mut BytesMut) -> Result<bool> {
    ensure_remaining(buf, 1, "bool")?;
    Ok(buf.get_u8() != 0)
}

/// Write a boolean as a single byte
#[inline]
pub fn write_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Read a length-prefixed UTF-8 string bounded to `max_codepoints`
///
/// # Format
/// - VarInt: byte length of the UTF-8 payload
/// - UTF-8 bytes (not null-terminated)
///
/// # Errors
/// Fails if the declared byte length is negative, exceeds
/// `4 * max_codepoints` (worst-case UTF-8 expansion), overruns the
/// buffer, is not valid UTF-8, or decodes to more than `max_codepoints`
/// codepoints. The bound is supplied per call site because different
/// packet fields allow different maximums.
pub fn read_string(buf: &mut BytesMut, max_codepoints: usize) -> Result<String> {
    let len = read_varint(buf)?;
    let len = usize::try_from(len)
        .map_err(|_| framing(format!("Negative string length {}", len)))?;

    if len > max_codepoints * 4 {
        return Err(framing(format!(
            "Declared string length {} exceeds cap {} ({} codepoints)",
            len,
            max_codepoints * 4,
            max_codepoints
        )));
    }
    ensure_remaining(buf, len, "string payload")?;

    let bytes = buf.copy_to_bytes(len);
    let value = std::str::from_utf8(&bytes)
        .map_err(|e| framing(format!("Invalid UTF-8 in string: {}", e)))?;

    if value.chars().count() > max_codepoints {
        return Err(framing(format!(
            "String has more than {} codepoints",
            max_codepoints
        )));
    }

    Ok(value.to_owned())
}

/// Write a length-prefixed UTF-8 string bounded to `max_codepoints`
///
/// # Errors
/// Fails if the string exceeds the codepoint bound; nothing is written
/// in that case.
pub fn write_string(buf: &mut BytesMut, value: &str, max_codepoints: usize) -> Result<()> {
    if value.chars().count() > max_codepoints {
        return Err(framing(format!(
            "Refusing to encode string of more than {} codepoints",
            max_codepoints
        )));
    }
    let bytes = value.as_bytes();
    write_varint(buf, bytes.len() as i32);
    buf.put_slice(bytes);
    Ok(())
}

/// Read a 128-bit identifier as two 64-bit big-endian halves (1.19+)
#[inline]
pub fn read_uuid(buf: &mut BytesMut) -> Result<Uuid> {
    ensure_remaining(buf, 16, "UUID")?;
    Ok(Uuid::from_u128(buf.get_u128()))
}

/// Write a 128-bit identifier as two 64-bit big-endian halves
#[inline]
pub fn write_uuid(buf: &mut BytesMut, uuid: Uuid) {
    buf.put_u128(uuid.as_u128());
}

/// Read a 128-bit identifier as four 32-bit big-endian segments
/// (1.16 through 1.18.x)
#[inline]
pub fn read_uuid_int_array(buf: &mut BytesMut) -> Result<Uuid> {
    ensure_remaining(buf, 16, "UUID int array")?;
    let mut value: u128 = 0;
    for _ in 0..4 {
        value = (value << 32) | u128::from(buf.get_u32());
    }
    Ok(Uuid::from_u128(value))
}

/// Write a 128-bit identifier as four 32-bit big-endian segments
#[inline]
pub fn write_uuid_int_array(buf: &mut BytesMut, uuid: Uuid) {
    let value = uuid.as_u128();
    for shift in [96u32, 64, 32, 0] {
        buf.put_u32((value >> shift) as u32);
    }
}

/// Read a 128-bit identifier in the 36-character dashed textual form
/// (1.7.6 through 1.15.x)
pub fn read_uuid_dashed(buf: &mut BytesMut) -> Result<Uuid> {
    let text = read_string(buf, 36)?;
    if text.len() != 36 {
        return Err(framing(format!(
            "Dashed UUID must be 36 characters, got {}",
            text.len()
        )));
    }
    Uuid::try_parse(&text).map_err(|e| framing(format!("Invalid dashed UUID: {}", e)))
}

/// Write a 128-bit identifier in the 36-character dashed textual form
pub fn write_uuid_dashed(buf: &mut BytesMut, uuid: Uuid) -> Result<()> {
    write_string(buf, &uuid.hyphenated().to_string(), 36)
}

/// Read a 128-bit identifier in the 32-character undashed textual form
/// (before 1.7.6)
pub fn read_uuid_undashed(buf: &mut BytesMut) -> Result<Uuid> {
    let text = read_string(buf, 32)?;
    if text.len() != 32 {
        return Err(framing(format!(
            "Undashed UUID must be 32 characters, got {}",
            text.len()
        )));
    }
    Uuid::try_parse(&text).map_err(|e| framing(format!("Invalid undashed UUID: {}", e)))
}

/// Write a 128-bit identifier in the 32-character undashed textual form
pub fn write_uuid_undashed(buf: &mut BytesMut, uuid: Uuid) -> Result<()> {
    write_string(buf, &uuid.simple().to_string(), 32)
}

/// Read a VarInt-length-prefixed byte array capped at `cap` bytes (1.8+)
pub fn read_byte_array(buf: &mut BytesMut, cap: usize) -> Result<Bytes> {
    let len = read_varint(buf)?;
    let len = usize::try_from(len)
        .map_err(|_| framing(format!("Negative byte array length {}", len)))?;
    if len > cap {
        return Err(framing(format!(
            "Byte array length {} exceeds cap {}",
            len, cap
        )));
    }
    ensure_remaining(buf, len, "byte array")?;
    Ok(buf.copy_to_bytes(len))
}

/// Write a VarInt-length-prefixed byte array
pub fn write_byte_array(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as i32);
    buf.put_slice(data);
}

/// Read an i16-length-prefixed byte array, the pre-1.8 array form used
/// by the encryption exchange
pub fn read_byte_array_legacy(buf: &mut BytesMut, cap: usize) -> Result<Bytes> {
    ensure_remaining(buf, 2, "legacy byte array length")?;
    let len = buf.get_i16();
    let len = usize::try_from(len)
        .map_err(|_| framing(format!("Negative legacy byte array length {}", len)))?;
    if len > cap {
        return Err(framing(format!(
            "Legacy byte array length {} exceeds cap {}",
            len, cap
        )));
    }
    ensure_remaining(buf, len, "legacy byte array")?;
    Ok(buf.copy_to_bytes(len))
}

/// Write an i16-length-prefixed byte array (pre-1.8 form)
pub fn write_byte_array_legacy(buf: &mut BytesMut, data: &[u8]) {
    buf.put_i16(data.len() as i16);
    buf.put_slice(data);
}

/// Drain the remaining bytes of the frame as an opaque payload
#[inline]
pub fn read_remaining(buf: &mut BytesMut) -> Bytes {
    let len = buf.remaining();
    buf.copy_to_bytes(len)
}

/// A signed profile property carried by login success
///
/// List ordering is wire-significant and is preserved, never sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

/// Maximum codepoints for a property name
const PROPERTY_NAME_MAX: usize = 64;

/// Maximum codepoints for a property value (base64 texture blobs)
const PROPERTY_VALUE_MAX: usize = 32767;

/// Maximum codepoints for a property signature
const PROPERTY_SIGNATURE_MAX: usize = 1024;

/// Read an ordered profile property list
///
/// # Format
/// - VarInt: property count
/// - count × { string name, string value, bool has_signature,
///   [string signature] }
pub fn read_properties(buf: &mut BytesMut) -> Result<Vec<ProfileProperty>> {
    let count = read_varint(buf)?;
    let count = usize::try_from(count)
        .map_err(|_| framing(format!("Negative property count {}", count)))?;

    let mut properties = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        let name = read_string(buf, PROPERTY_NAME_MAX)?;
        let value = read_string(buf, PROPERTY_VALUE_MAX)?;
        let signature = if read_bool(buf)? {
            Some(read_string(buf, PROPERTY_SIGNATURE_MAX)?)
        } else {
            None
        };
        properties.push(ProfileProperty {
            name,
            value,
            signature,
        });
    }

    Ok(properties)
}

/// Write an ordered profile property list
pub fn write_properties(buf: &mut BytesMut, properties: &[ProfileProperty]) -> Result<()> {
    write_varint(buf, properties.len() as i32);
    for property in properties {
        write_string(buf, &property.name, PROPERTY_NAME_MAX)?;
        write_string(buf, &property.value, PROPERTY_VALUE_MAX)?;
        match &property.signature {
            Some(signature) => {
                write_bool(buf, true);
                write_string(buf, signature, PROPERTY_SIGNATURE_MAX)?;
            }
            None => write_bool(buf, false),
        }
    }
    Ok(())
}
