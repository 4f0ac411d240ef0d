//! Frame layer: VarInt-length-delimited packet framing
//!
//! The wire carries `[VarInt length][payload]` units, where the payload
//! is the packet id plus its body. The length prefix is at most 3 bytes
//! (2^21 − 1 cap), matching the vanilla frame limit. Everything inside
//! the payload is the codec engine's business; this layer only cuts
//! complete frames out of the stream and stamps lengths onto outgoing
//! payloads.
//!
//! Compression and encryption wrap this layer when negotiated; they are
//! outer concerns and never seen by the codec engine.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use waypoint_core::WaypointError;
use waypoint_protocol::codec::varint_len;

/// Frame payload cap: the largest length a 3-byte VarInt can carry
pub const MAX_FRAME_LENGTH: usize = 2_097_151;

/// Codec cutting VarInt-framed packets out of a TCP stream
#[derive(Debug, Default)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = WaypointError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, WaypointError> {
        // Peek the length varint without consuming until the frame is whole
        let mut length: usize = 0;
        let mut header_len = 0;
        loop {
            if header_len >= src.len() {
                return Ok(None);
            }
            let byte = src[header_len];
            length |= usize::from(byte & 0x7F) << (7 * header_len);
            header_len += 1;

            if byte & 0x80 == 0 {
                break;
            }
            if header_len == 3 {
                return Err(WaypointError::Framing(
                    "Frame length prefix exceeds 3 bytes".into(),
                ));
            }
        }

        if length > MAX_FRAME_LENGTH {
            return Err(WaypointError::Framing(format!(
                "Declared frame length {} exceeds cap {}",
                length, MAX_FRAME_LENGTH
            )));
        }
        if src.len() < header_len + length {
            src.reserve(header_len + length - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        Ok(Some(src.split_to(length)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = WaypointError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), WaypointError> {
        if payload.len() > MAX_FRAME_LENGTH {
            return Err(WaypointError::Framing(format!(
                "Refusing to frame {} byte payload",
                payload.len()
            )));
        }
        dst.reserve(varint_len(payload.len() as i32) + payload.len());
        let mut value = payload.len() as u32;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            dst.put_u8(byte);
            if value == 0 {
                break;
            }
        }
        dst.put_slice(&payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let mut codec = FrameCodec;
        let payload = Bytes::from_static(&[0x00, 0x01, 0x02, 0x03]);

        let mut wire = BytesMut::new();
        codec.encode(payload.clone(), &mut wire).unwrap();
        assert_eq!(wire[0], 4);

        let frame = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(&frame[..], &payload[..]);
        assert!(wire.is_empty());
    }

    #[test]
    fn test_partial_frame_waits_for_more_bytes() {
        let mut codec = FrameCodec;

        let mut wire = BytesMut::from(&[0x05, 0xAA, 0xBB][..]);
        assert!(codec.decode(&mut wire).unwrap().is_none());
        // Nothing consumed while incomplete
        assert_eq!(wire.len(), 3);

        wire.extend_from_slice(&[0xCC, 0xDD, 0xEE]);
        let frame = codec.decode(&mut wire).unwrap().unwrap();
        assert_eq!(&frame[..], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
    }

    #[test]
    fn test_two_frames_in_one_read() {
        let mut codec = FrameCodec;
        let mut wire = BytesMut::from(&[0x01, 0x11, 0x02, 0x22, 0x33][..]);

        assert_eq!(&codec.decode(&mut wire).unwrap().unwrap()[..], &[0x11]);
        assert_eq!(&codec.decode(&mut wire).unwrap().unwrap()[..], &[0x22, 0x33]);
        assert!(codec.decode(&mut wire).unwrap().is_none());
    }

    #[test]
    fn test_oversized_length_prefix_is_framing_error() {
        let mut codec = FrameCodec;
        // 4-byte continuation run in the length prefix
        let mut wire = BytesMut::from(&[0x80, 0x80, 0x80, 0x01][..]);
        assert!(matches!(
            codec.decode(&mut wire),
            Err(WaypointError::Framing(_))
        ));
    }

    #[test]
    fn test_empty_frame_decodes() {
        let mut codec = FrameCodec;
        let mut wire = BytesMut::from(&[0x00][..]);
        let frame = codec.decode(&mut wire).unwrap().unwrap();
        assert!(frame.is_empty());
    }
}
