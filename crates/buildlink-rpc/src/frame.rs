use bytes::{Buf, BufMut, BytesMut};

use buildlink_msgpack::{pack_into, unpack, Value};

use crate::error::FrameError;

/// Length prefix: 4 bytes, big-endian, counting everything after itself.
pub const LENGTH_SIZE: usize = 4;

/// Channel identifier: 8 bytes, big-endian.
pub const CHANNEL_SIZE: usize = 8;

/// Total header size preceding the body.
pub const HEADER_SIZE: usize = LENGTH_SIZE + CHANNEL_SIZE;

/// Default maximum frame size: 64 MiB. Build descriptions and transferred
/// project data can run large; anything past this is treated as a corrupted
/// length prefix.
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024 * 1024;

/// One multiplexed frame: a channel correlation handle plus a body value.
///
/// Ephemeral: constructed on decode from bytes or on encode from an
/// envelope, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// The channel correlating this message with its exchange.
    pub channel: u64,
    /// The decoded MessagePack body.
    pub body: Value,
}

impl Packet {
    pub fn new(channel: u64, body: Value) -> Self {
        Self { channel, body }
    }
}

/// Configuration for packet framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum accepted frame size (channel id + body) in bytes.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
        }
    }
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────────┬────────────────┬──────────────────────────┐
/// │ Length (4B BE)│ Channel (8B BE)│ MessagePack body          │
/// │ = 8 + body len│                │                           │
/// └───────────────┴────────────────┴──────────────────────────┘
/// ```
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) -> Result<(), FrameError> {
    let mut body = BytesMut::new();
    pack_into(&packet.body, &mut body);

    let frame_len = CHANNEL_SIZE + body.len();
    if frame_len > u32::MAX as usize {
        return Err(FrameError::FrameTooLarge {
            size: frame_len,
            max: u32::MAX as usize,
        });
    }

    dst.reserve(LENGTH_SIZE + frame_len);
    dst.put_u32(frame_len as u32);
    dst.put_u64(packet.channel);
    dst.put_slice(&body);
    Ok(())
}

/// Decode a packet from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Any error means
/// the stream's byte boundaries are no longer trustworthy; the caller must
/// treat the connection as corrupted.
pub fn decode_packet(src: &mut BytesMut, max_frame_size: usize) -> Result<Option<Packet>, FrameError> {
    if src.len() < LENGTH_SIZE {
        return Ok(None); // Need more data
    }

    let frame_len = u32::from_be_bytes(src[0..LENGTH_SIZE].try_into().unwrap()) as usize;

    if frame_len < CHANNEL_SIZE {
        return Err(FrameError::InvalidLength { len: frame_len });
    }
    if frame_len > max_frame_size {
        return Err(FrameError::FrameTooLarge {
            size: frame_len,
            max: max_frame_size,
        });
    }

    if src.len() < LENGTH_SIZE + frame_len {
        return Ok(None); // Need more data
    }

    src.advance(LENGTH_SIZE);
    let frame = src.split_to(frame_len);
    let channel = u64::from_be_bytes(frame[0..CHANNEL_SIZE].try_into().unwrap());

    // A well-formed frame contains exactly one complete body value.
    let (body, remainder) = unpack(&frame[CHANNEL_SIZE..])?;
    if !remainder.is_empty() {
        return Err(FrameError::TrailingBytes {
            trailing: remainder.len(),
        });
    }

    tracing::trace!(channel, frame_len, "decoded packet");
    Ok(Some(Packet { channel, body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> Value {
        Value::Array(vec![Value::from("PING"), Value::Nil])
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let packet = Packet::new(42, body());

        encode_packet(&packet, &mut buf).unwrap();
        let decoded = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap().unwrap();

        assert_eq!(decoded, packet);
        assert!(buf.is_empty());
    }

    #[test]
    fn header_layout_is_big_endian() {
        let mut buf = BytesMut::new();
        encode_packet(&Packet::new(1, Value::Nil), &mut buf).unwrap();

        // length = 8 (channel) + 1 (nil body)
        assert_eq!(&buf[..LENGTH_SIZE], &[0x00, 0x00, 0x00, 0x09]);
        assert_eq!(
            &buf[LENGTH_SIZE..HEADER_SIZE],
            &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(buf[HEADER_SIZE], 0xC0);
    }

    #[test]
    fn decode_incomplete_header_needs_more_data() {
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);
        assert!(decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn decode_incomplete_body_needs_more_data() {
        let mut buf = BytesMut::new();
        encode_packet(&Packet::new(7, body()), &mut buf).unwrap();
        buf.truncate(buf.len() - 1);

        assert!(decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap().is_none());
    }

    #[test]
    fn implausible_length_is_fatal() {
        let mut buf = BytesMut::new();
        buf.put_u32(0xFFFF_FFFF);
        buf.put_u64(1);

        let err = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
    }

    #[test]
    fn length_too_short_for_channel_is_fatal() {
        let mut buf = BytesMut::new();
        buf.put_u32(4);
        buf.put_slice(&[0, 0, 0, 0]);

        let err = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap_err();
        assert!(matches!(err, FrameError::InvalidLength { len: 4 }));
    }

    #[test]
    fn malformed_body_in_complete_frame_is_fatal() {
        let mut buf = BytesMut::new();
        buf.put_u32(9);
        buf.put_u64(3);
        buf.put_u8(0xC1); // reserved tag

        let err = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap_err();
        assert!(matches!(err, FrameError::Body(_)));
    }

    #[test]
    fn truncated_body_within_complete_frame_is_fatal() {
        // Frame claims 9 bytes (channel + 1), but the body byte declares a
        // string longer than the frame holds.
        let mut buf = BytesMut::new();
        buf.put_u32(9);
        buf.put_u64(3);
        buf.put_u8(0xA5); // fixstr of 5 with no payload inside the frame

        let err = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Body(buildlink_msgpack::UnpackError::InsufficientData)
        ));
    }

    #[test]
    fn trailing_bytes_after_body_are_fatal() {
        let mut buf = BytesMut::new();
        buf.put_u32(10);
        buf.put_u64(3);
        buf.put_u8(0xC0);
        buf.put_u8(0xC0); // second value crammed into the frame

        let err = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap_err();
        assert!(matches!(err, FrameError::TrailingBytes { trailing: 1 }));
    }

    #[test]
    fn multiple_packets_decode_in_order() {
        let mut buf = BytesMut::new();
        encode_packet(&Packet::new(1, Value::from("one")), &mut buf).unwrap();
        encode_packet(&Packet::new(2, Value::from("two")), &mut buf).unwrap();

        let first = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap().unwrap();
        let second = decode_packet(&mut buf, DEFAULT_MAX_FRAME).unwrap().unwrap();

        assert_eq!((first.channel, second.channel), (1, 2));
        assert!(buf.is_empty());
    }

    #[test]
    fn frame_size_limit_applies_to_declared_length() {
        let mut buf = BytesMut::new();
        encode_packet(&Packet::new(1, Value::binary(vec![0u8; 64])), &mut buf).unwrap();

        let err = decode_packet(&mut buf, 32).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
    }
}
