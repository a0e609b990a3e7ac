//! Versioned command catalogs for the build-service RPC protocol.
//!
//! Each negotiated [`ProtocolVersion`] supplies a request and a response
//! dispatch table mapping upper-snake-case command names (element 0 of a
//! packet body) to typed payload constructors. The dispatch engine in
//! `buildlink-rpc` stays version-agnostic; only the tables differ.
//!
//! Payload shapes are positionally fixed-arity arrays. Every decoder
//! validates arity first, then parses fields, so a shape mismatch produces
//! one precisely located error instead of a cascade.

pub mod build;
pub mod operation;
pub mod request;
pub mod response;
pub mod session;

use buildlink_msgpack::Value;
use buildlink_rpc::{DispatchTable, Envelope};

pub use request::RequestPayload;
pub use response::ResponsePayload;

/// A request envelope for a given catalog.
pub type Request = Envelope<RequestPayload>;

/// A response envelope for a given catalog.
pub type Response = Envelope<ResponsePayload>;

/// A negotiated protocol version, selecting which command catalog decodes
/// this connection's traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    pub const LATEST: Self = Self::V2;

    /// Resolve a version number exchanged during session negotiation.
    pub fn from_number(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    pub fn number(self) -> u64 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// The request catalog for this version.
    pub fn request_table(self) -> &'static DispatchTable<RequestPayload> {
        request::table_for(self)
    }

    /// The response catalog for this version.
    pub fn response_table(self) -> &'static DispatchTable<ResponsePayload> {
        response::table_for(self)
    }
}

/// Raw body values of a message whose command name (or shape) this catalog
/// does not recognize. Kept verbatim so the message can be re-encoded or
/// inspected without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPayload {
    pub values: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_numbers_roundtrip() {
        for version in [ProtocolVersion::V1, ProtocolVersion::V2] {
            assert_eq!(ProtocolVersion::from_number(version.number()), Some(version));
        }
        assert_eq!(ProtocolVersion::from_number(0), None);
        assert_eq!(ProtocolVersion::from_number(99), None);
    }

    #[test]
    fn latest_is_highest_number() {
        assert_eq!(ProtocolVersion::LATEST.number(), 2);
    }
}
