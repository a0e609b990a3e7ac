use bytes::BytesMut;

use crate::error::FrameError;
use crate::frame::{decode_packet, FrameConfig, Packet};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Streaming packet reassembly.
///
/// Fed arbitrarily-sized chunks as they arrive from the transport, the
/// decoder buffers across calls and emits complete packets once enough
/// bytes have accumulated, retaining partial trailing bytes for the next
/// call. Chunk boundaries never need to align with frame boundaries.
///
/// Holds per-connection mutable state: one decoder per connection, owned
/// by the single context processing that connection's inbound bytes. A
/// returned error means the stream is corrupted; the decoder must be
/// discarded along with the connection.
#[derive(Debug)]
pub struct PacketDecoder {
    buf: BytesMut,
    config: FrameConfig,
}

impl PacketDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Feed one chunk of bytes; returns every packet completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Packet>, FrameError> {
        self.buf.extend_from_slice(chunk);

        let mut packets = Vec::new();
        while let Some(packet) = decode_packet(&mut self.buf, self.config.max_frame_size)? {
            packets.push(packet);
        }
        Ok(packets)
    }

    /// Bytes buffered waiting for the rest of a frame.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    /// True when no partial frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current framing configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new()
    }
}
