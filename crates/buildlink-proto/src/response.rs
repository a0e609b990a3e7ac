//! The response payload union and its dispatch table.

use std::sync::LazyLock;

use buildlink_msgpack::Value;
use buildlink_rpc::{
    check_arity, parse_args, parse_object, parse_string, CommandDecoder, DecodeError,
    DecodePayload, DispatchTable, EncodePayload, Path, Payload,
};

use crate::operation::{
    BuildCreated, BuildDiagnostic, BuildOperationEnded, BuildOperationPreparationCompleted,
    BuildStarted,
};
use crate::session::SessionCreated;
use crate::{ProtocolVersion, UnknownPayload};

pub const PING: &str = "PING";
pub const SESSION_CREATED: &str = "SESSION_CREATED";
pub const BUILD_CREATED: &str = "BUILD_CREATED";
pub const BUILD_OPERATION_PREPARATION_COMPLETED: &str = "BUILD_OPERATION_PREPARATION_COMPLETED";
pub const BUILD_STARTED: &str = "BUILD_STARTED";
pub const BUILD_DIAGNOSTIC: &str = "BUILD_DIAGNOSTIC";
pub const BUILD_OPERATION_ENDED: &str = "BUILD_OPERATION_ENDED";
pub const ERROR: &str = "ERROR";

/// A keep-alive probe. Carries no fields; its wire body is nil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ping;

impl DecodePayload for Ping {
    fn decode(_values: &[Value], _path: &Path) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}

impl EncodePayload for Ping {
    fn encode(&self) -> Value {
        Value::Nil
    }
}

/// A service-level failure report for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

impl DecodePayload for ErrorResponse {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 1, path)?;

        Ok(Self {
            message: parse_string(args, &path.child(0))?,
        })
    }
}

impl EncodePayload for ErrorResponse {
    fn encode(&self) -> Value {
        Value::Array(vec![Value::from(self.message.as_str())])
    }
}

/// Every response shape the catalogs can produce, plus the mandatory
/// forward-compatibility fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    Ping(Ping),
    SessionCreated(SessionCreated),
    BuildCreated(BuildCreated),
    BuildOperationPreparationCompleted(BuildOperationPreparationCompleted),
    BuildStarted(BuildStarted),
    BuildDiagnostic(BuildDiagnostic),
    BuildOperationEnded(BuildOperationEnded),
    Error(ErrorResponse),
    Unknown(UnknownPayload),
}

impl ResponsePayload {
    /// The command name this payload dispatches under, if recognized.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            ResponsePayload::Ping(_) => Some(PING),
            ResponsePayload::SessionCreated(_) => Some(SESSION_CREATED),
            ResponsePayload::BuildCreated(_) => Some(BUILD_CREATED),
            ResponsePayload::BuildOperationPreparationCompleted(_) => {
                Some(BUILD_OPERATION_PREPARATION_COMPLETED)
            }
            ResponsePayload::BuildStarted(_) => Some(BUILD_STARTED),
            ResponsePayload::BuildDiagnostic(_) => Some(BUILD_DIAGNOSTIC),
            ResponsePayload::BuildOperationEnded(_) => Some(BUILD_OPERATION_ENDED),
            ResponsePayload::Error(_) => Some(ERROR),
            ResponsePayload::Unknown(_) => None,
        }
    }
}

impl Payload for ResponsePayload {
    fn unknown(values: Vec<Value>) -> Self {
        ResponsePayload::Unknown(UnknownPayload { values })
    }

    fn encode_body(&self) -> Value {
        let (name, fields) = match self {
            ResponsePayload::Ping(r) => (PING, r.encode()),
            ResponsePayload::SessionCreated(r) => (SESSION_CREATED, r.encode()),
            ResponsePayload::BuildCreated(r) => (BUILD_CREATED, r.encode()),
            ResponsePayload::BuildOperationPreparationCompleted(r) => {
                (BUILD_OPERATION_PREPARATION_COMPLETED, r.encode())
            }
            ResponsePayload::BuildStarted(r) => (BUILD_STARTED, r.encode()),
            ResponsePayload::BuildDiagnostic(r) => (BUILD_DIAGNOSTIC, r.encode()),
            ResponsePayload::BuildOperationEnded(r) => (BUILD_OPERATION_ENDED, r.encode()),
            ResponsePayload::Error(r) => (ERROR, r.encode()),
            ResponsePayload::Unknown(u) => return Value::Array(u.values.clone()),
        };
        Value::Array(vec![Value::from(name), fields])
    }
}

fn decode_ping(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::Ping(parse_object(values, &path.child(1))?))
}

fn decode_session_created(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::SessionCreated(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_build_created(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::BuildCreated(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_preparation_completed(
    values: &[Value],
    path: &Path,
) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::BuildOperationPreparationCompleted(
        parse_object(values, &path.child(1))?,
    ))
}

fn decode_build_started(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::BuildStarted(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_build_diagnostic(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::BuildDiagnostic(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_build_operation_ended(
    values: &[Value],
    path: &Path,
) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::BuildOperationEnded(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_error(values: &[Value], path: &Path) -> Result<ResponsePayload, DecodeError> {
    Ok(ResponsePayload::Error(parse_object(values, &path.child(1))?))
}

// Response shapes have been stable across negotiated versions; both
// catalogs share one table.
static TABLE: LazyLock<DispatchTable<ResponsePayload>> = LazyLock::new(|| {
    DispatchTable::new(&[
        (PING, decode_ping as CommandDecoder<ResponsePayload>),
        (SESSION_CREATED, decode_session_created),
        (BUILD_CREATED, decode_build_created),
        (
            BUILD_OPERATION_PREPARATION_COMPLETED,
            decode_preparation_completed,
        ),
        (BUILD_STARTED, decode_build_started),
        (BUILD_DIAGNOSTIC, decode_build_diagnostic),
        (BUILD_OPERATION_ENDED, decode_build_operation_ended),
        (ERROR, decode_error),
    ])
});

pub(crate) fn table_for(_version: ProtocolVersion) -> &'static DispatchTable<ResponsePayload> {
    &TABLE
}
