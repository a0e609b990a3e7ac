use buildlink_msgpack::Value;

use crate::dispatch::DispatchTable;
use crate::frame::Packet;
use crate::path::Path;

/// The payload capability: a tagged union of a protocol version's command
/// shapes, plus a mandatory `unknown` variant holding raw values.
pub trait Payload: Sized {
    /// The forward-compatibility fallback carrying the original,
    /// unmodified body values.
    fn unknown(values: Vec<Value>) -> Self;

    /// Re-encode into a packet body value.
    fn encode_body(&self) -> Value;
}

/// A channel id paired with a typed payload: one request or response on
/// the multiplexed stream, depending on which payload type instantiates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<P> {
    pub channel: u64,
    pub payload: P,
}

impl<P: Payload> Envelope<P> {
    pub fn new(channel: u64, payload: P) -> Self {
        Self { channel, payload }
    }

    /// Decode a packet's body through a version's dispatch table.
    ///
    /// Payload decode failures are not fatal: the error is logged with its
    /// channel and path context and the payload degrades to `unknown`, so
    /// one malformed or unrecognized message never tears down the stream.
    /// (Framing-level failures never reach this point; they poison the
    /// whole connection.)
    pub fn from_packet(packet: Packet, table: &DispatchTable<P>) -> Self {
        let channel = packet.channel;
        let values = match packet.body {
            Value::Array(items) => items,
            other => vec![other],
        };

        let payload = match table.decode(&values, &Path::root()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(
                    channel,
                    error = %err,
                    "failed to decode payload, substituting unknown"
                );
                P::unknown(values)
            }
        };

        Self { channel, payload }
    }

    /// Encode back into a packet.
    pub fn into_packet(self) -> Packet {
        Packet::new(self.channel, self.payload.encode_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{check_arity, parse_args, parse_string};
    use crate::dispatch::CommandDecoder;
    use crate::error::DecodeError;

    #[derive(Debug, Clone, PartialEq)]
    enum TestPayload {
        Greet { name: String },
        Unknown(Vec<Value>),
    }

    impl Payload for TestPayload {
        fn unknown(values: Vec<Value>) -> Self {
            TestPayload::Unknown(values)
        }

        fn encode_body(&self) -> Value {
            match self {
                TestPayload::Greet { name } => Value::Array(vec![
                    Value::from("GREET"),
                    Value::Array(vec![Value::from(name.as_str())]),
                ]),
                TestPayload::Unknown(values) => Value::Array(values.clone()),
            }
        }
    }

    fn decode_greet(values: &[Value], path: &Path) -> Result<TestPayload, DecodeError> {
        let args_path = path.child(1);
        let args = parse_args(values, &args_path)?;
        check_arity(args, 1, &args_path)?;
        Ok(TestPayload::Greet {
            name: parse_string(args, &args_path.child(0))?,
        })
    }

    fn table() -> DispatchTable<TestPayload> {
        DispatchTable::new(&[("GREET", decode_greet as CommandDecoder<TestPayload>)])
    }

    fn greet_packet(channel: u64) -> Packet {
        Packet::new(
            channel,
            Value::Array(vec![
                Value::from("GREET"),
                Value::Array(vec![Value::from("world")]),
            ]),
        )
    }

    #[test]
    fn decodes_typed_payload_with_channel() {
        let envelope = Envelope::from_packet(greet_packet(17), &table());
        assert_eq!(envelope.channel, 17);
        assert_eq!(
            envelope.payload,
            TestPayload::Greet {
                name: "world".to_string()
            }
        );
    }

    #[test]
    fn malformed_payload_degrades_to_unknown() {
        // Correct name, wrong arity: the decode error is swallowed and the
        // original values survive in the unknown variant.
        let body = vec![Value::from("GREET"), Value::Array(vec![])];
        let packet = Packet::new(3, Value::Array(body.clone()));

        let envelope = Envelope::from_packet(packet, &table());
        assert_eq!(envelope.channel, 3);
        assert_eq!(envelope.payload, TestPayload::Unknown(body));
    }

    #[test]
    fn non_array_body_degrades_to_unknown() {
        let packet = Packet::new(5, Value::from("lone string"));
        let envelope = Envelope::from_packet(packet, &table());
        assert_eq!(
            envelope.payload,
            TestPayload::Unknown(vec![Value::from("lone string")])
        );
    }

    #[test]
    fn envelope_roundtrips_through_packet() {
        let original = Envelope::new(
            9,
            TestPayload::Greet {
                name: "roundtrip".to_string(),
            },
        );
        let packet = original.clone().into_packet();
        let decoded = Envelope::from_packet(packet, &table());
        assert_eq!(decoded, original);
    }

    #[test]
    fn unknown_payload_reencodes_original_body() {
        let body = vec![Value::from("MYSTERY"), Value::Uint(4)];
        let packet = Packet::new(2, Value::Array(body.clone()));

        let envelope = Envelope::from_packet(packet, &table());
        let reencoded = envelope.into_packet();
        assert_eq!(reencoded.body, Value::Array(body));
        assert_eq!(reencoded.channel, 2);
    }
}
