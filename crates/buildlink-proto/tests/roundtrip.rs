//! End-to-end flow: wire bytes through streaming reassembly, dispatch and
//! envelope decoding into typed payloads, and back out again.

use buildlink_msgpack::Value;
use buildlink_proto::session::CreateSessionRequest;
use buildlink_proto::{ProtocolVersion, Request, RequestPayload, Response, ResponsePayload};
use buildlink_rpc::{encode_packet, Envelope, Packet, PacketDecoder, Payload};
use bytes::BytesMut;

fn create_session_packet(channel: u64) -> Packet {
    Packet::new(
        channel,
        Value::Array(vec![
            Value::from("CREATE_SESSION"),
            Value::Array(vec![
                Value::from("MyApp"),
                Value::from("/ide/App.app"),
                Value::from("/var/cache/sessions"),
                Value::Nil,
            ]),
        ]),
    )
}

fn wire(packets: &[Packet]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for packet in packets {
        encode_packet(packet, &mut buf).unwrap();
    }
    buf.to_vec()
}

#[test]
fn bytes_to_typed_request_and_back() {
    let bytes = wire(&[create_session_packet(42)]);

    let mut decoder = PacketDecoder::new();
    let packets = decoder.feed(&bytes).unwrap();
    assert_eq!(packets.len(), 1);

    let table = ProtocolVersion::LATEST.request_table();
    let request = Request::from_packet(packets[0].clone(), table);
    assert_eq!(request.channel, 42);

    let payload = match &request.payload {
        RequestPayload::CreateSession(payload) => payload.clone(),
        other => panic!("unexpected payload: {other:?}"),
    };
    assert_eq!(
        payload,
        CreateSessionRequest {
            name: "MyApp".to_string(),
            app_path: "/ide/App.app".to_string(),
            cache_path: "/var/cache/sessions".to_string(),
            inferior_products_path: None,
        }
    );

    // Back out: envelope → packet → bytes → identical frame.
    let reencoded = wire(&[request.into_packet()]);
    assert_eq!(reencoded, bytes);
}

#[test]
fn byte_at_a_time_reassembly_matches_bulk_decode() {
    let packets = vec![
        create_session_packet(1),
        Packet::new(
            2,
            Value::Array(vec![
                Value::from("BUILD_START"),
                Value::Array(vec![Value::from("S-1"), Value::Uint(8)]),
            ]),
        ),
        Packet::new(
            3,
            Value::Array(vec![Value::from("PING"), Value::Nil]),
        ),
    ];
    let bytes = wire(&packets);

    let mut bulk = PacketDecoder::new();
    let all_at_once = bulk.feed(&bytes).unwrap();

    let mut trickle = PacketDecoder::new();
    let mut one_at_a_time = Vec::new();
    for byte in &bytes {
        one_at_a_time.extend(trickle.feed(std::slice::from_ref(byte)).unwrap());
    }

    assert_eq!(all_at_once, packets);
    assert_eq!(one_at_a_time, packets);
}

#[test]
fn unrecognized_command_survives_decode_and_reencode() {
    let body = vec![
        Value::from("WORKSPACE_DESCRIPTION_CHANGED"),
        Value::Array(vec![Value::from("S-1")]),
        Value::Uint(77),
    ];
    let packet = Packet::new(5, Value::Array(body.clone()));

    let request = Request::from_packet(packet, ProtocolVersion::V1.request_table());
    assert_eq!(request.payload, RequestPayload::unknown(body.clone()));

    // The unmodified values go back on the wire.
    assert_eq!(request.into_packet().body, Value::Array(body));
}

#[test]
fn malformed_known_command_degrades_to_unknown_not_error() {
    // CREATE_SESSION with a numeric name field.
    let body = vec![
        Value::from("CREATE_SESSION"),
        Value::Array(vec![
            Value::Uint(1),
            Value::from("/a"),
            Value::from("/c"),
            Value::Nil,
        ]),
    ];
    let packet = Packet::new(6, Value::Array(body.clone()));

    let request = Request::from_packet(packet, ProtocolVersion::LATEST.request_table());
    assert_eq!(request.channel, 6);
    assert_eq!(request.payload, RequestPayload::unknown(body));
}

#[test]
fn create_build_decodes_per_negotiated_version() {
    let build_request = Value::Array(vec![
        // parameters
        Value::Array(vec![
            Value::from("build"),
            Value::from("Debug"),
            Value::Array(vec![
                Value::from("macosx"),
                Value::from("macosx15.2"),
                Value::from("macos"),
                Value::from("arm64"),
            ]),
            Value::from("arm64"),
            Value::Array(vec![
                Value::from("/dd"),
                Value::from("/dd/Products"),
                Value::from("/dd/Intermediates"),
                Value::from("/dd/PCH"),
                Value::Nil,
                Value::Bool(true),
            ]),
            Value::Array(vec![Value::Nil, Value::Nil, Value::Nil]),
            Value::Nil,
        ]),
        // configured targets
        Value::Array(vec![Value::from("target-guid")]),
        Value::Bool(true),
        Value::Bool(true),
        Value::Bool(false),
    ]);

    let v2_body = Value::Array(vec![
        Value::from("CREATE_BUILD"),
        Value::Array(vec![
            Value::from("S-1"),
            Value::Uint(99),
            build_request.clone(),
            Value::Bool(false),
        ]),
    ]);
    let request = Request::from_packet(
        Packet::new(9, v2_body),
        ProtocolVersion::V2.request_table(),
    );
    match request.payload {
        RequestPayload::CreateBuild(create) => {
            assert_eq!(create.session_handle, "S-1");
            assert_eq!(create.response_channel, Some(99));
            assert_eq!(create.build_request.parameters.action, "build");
            assert_eq!(
                create.build_request.parameters.active_run_destination.sdk_variant.raw_value,
                "macos"
            );
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let v1_body = Value::Array(vec![
        Value::from("CREATE_BUILD"),
        Value::Array(vec![
            Value::from("S-1"),
            build_request,
            Value::Bool(true),
        ]),
    ]);
    let request = Request::from_packet(
        Packet::new(10, v1_body),
        ProtocolVersion::V1.request_table(),
    );
    match request.payload {
        RequestPayload::CreateBuild(create) => {
            assert_eq!(create.response_channel, None);
            assert!(create.only_create_build_description);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn responses_flow_both_directions() {
    let response = Response::new(
        31,
        ResponsePayload::BuildCreated(buildlink_proto::operation::BuildCreated {
            build_number: 12,
        }),
    );

    let bytes = wire(&[response.clone().into_packet()]);
    let mut decoder = PacketDecoder::new();
    let packets = decoder.feed(&bytes).unwrap();

    let decoded = Envelope::from_packet(
        packets[0].clone(),
        ProtocolVersion::LATEST.response_table(),
    );
    assert_eq!(decoded, response);
}

#[test]
fn corrupted_stream_is_fatal_unlike_bad_payloads() {
    // A frame whose declared length is absurd poisons the stream.
    let mut bytes = wire(&[create_session_packet(1)]);
    bytes[0] = 0xFF; // corrupt the length prefix high byte

    let mut decoder = PacketDecoder::new();
    assert!(decoder.feed(&bytes).is_err());
}
