//! RPC layer of buildlink: packet framing with channel multiplexing, and a
//! structured decode framework that turns untyped MessagePack bodies into
//! strongly-typed request/response payloads.
//!
//! Layering, bottom up:
//! - [`frame`] parses and serializes length-prefixed packets
//!   (`[length][channel id][body]`), including streaming reassembly from
//!   partial reads via [`stream::PacketDecoder`].
//! - [`decode`] extracts typed fields out of decoded value trees, failing
//!   with path-qualified errors.
//! - [`dispatch`] maps a command name (element 0 of the body array) to a
//!   typed payload via a per-protocol-version table, degrading unknown
//!   names to an `unknown` payload for forward compatibility.
//! - [`envelope`] pairs a channel id with a typed payload and converts
//!   to/from packets; payload decode failures are logged and degraded,
//!   never fatal to the connection. Framing failures are fatal.

pub mod decode;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod path;
pub mod reader;
pub mod stream;
pub mod writer;

pub use decode::{
    check_arity, parse_args, parse_bool, parse_object, parse_optional_string, parse_string,
    parse_uint64, parse_unknown, DecodePayload, EncodePayload,
};
pub use dispatch::{CommandDecoder, DispatchTable};
pub use envelope::{Envelope, Payload};
pub use error::{DecodeError, FrameError};
pub use frame::{
    decode_packet, encode_packet, FrameConfig, Packet, CHANNEL_SIZE, DEFAULT_MAX_FRAME,
    HEADER_SIZE, LENGTH_SIZE,
};
pub use path::Path;
pub use reader::PacketReader;
pub use stream::PacketDecoder;
pub use writer::PacketWriter;
