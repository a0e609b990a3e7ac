//! The request payload union and its per-version dispatch tables.

use std::sync::LazyLock;

use buildlink_msgpack::Value;
use buildlink_rpc::{
    parse_object, CommandDecoder, DecodeError, DispatchTable, EncodePayload, Path, Payload,
};

use crate::build::{
    BuildCancelRequest, BuildStartRequest, CreateBuildRequest, IndexingInfoRequest,
    PreviewInfoRequest,
};
use crate::session::{
    CreateSessionRequest, SetSessionSystemInfoRequest, SetSessionUserInfoRequest,
    TransferSessionPifRequest,
};
use crate::{ProtocolVersion, UnknownPayload};

pub const CREATE_SESSION: &str = "CREATE_SESSION";
pub const TRANSFER_SESSION_PIF_REQUEST: &str = "TRANSFER_SESSION_PIF_REQUEST";
pub const SET_SESSION_SYSTEM_INFO: &str = "SET_SESSION_SYSTEM_INFO";
pub const SET_SESSION_USER_INFO: &str = "SET_SESSION_USER_INFO";
pub const CREATE_BUILD: &str = "CREATE_BUILD";
pub const BUILD_START: &str = "BUILD_START";
pub const BUILD_CANCEL: &str = "BUILD_CANCEL";
pub const INDEXING_INFO_REQUESTED: &str = "INDEXING_INFO_REQUESTED";
pub const PREVIEW_INFO_REQUESTED: &str = "PREVIEW_INFO_REQUESTED";

/// Every request shape the catalogs can produce, plus the mandatory
/// forward-compatibility fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    CreateSession(CreateSessionRequest),
    TransferSessionPif(TransferSessionPifRequest),
    SetSessionSystemInfo(SetSessionSystemInfoRequest),
    SetSessionUserInfo(SetSessionUserInfoRequest),
    CreateBuild(CreateBuildRequest),
    BuildStart(BuildStartRequest),
    BuildCancel(BuildCancelRequest),
    IndexingInfo(IndexingInfoRequest),
    PreviewInfo(PreviewInfoRequest),
    Unknown(UnknownPayload),
}

impl RequestPayload {
    /// The command name this payload dispatches under, if recognized.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            RequestPayload::CreateSession(_) => Some(CREATE_SESSION),
            RequestPayload::TransferSessionPif(_) => Some(TRANSFER_SESSION_PIF_REQUEST),
            RequestPayload::SetSessionSystemInfo(_) => Some(SET_SESSION_SYSTEM_INFO),
            RequestPayload::SetSessionUserInfo(_) => Some(SET_SESSION_USER_INFO),
            RequestPayload::CreateBuild(_) => Some(CREATE_BUILD),
            RequestPayload::BuildStart(_) => Some(BUILD_START),
            RequestPayload::BuildCancel(_) => Some(BUILD_CANCEL),
            RequestPayload::IndexingInfo(_) => Some(INDEXING_INFO_REQUESTED),
            RequestPayload::PreviewInfo(_) => Some(PREVIEW_INFO_REQUESTED),
            RequestPayload::Unknown(_) => None,
        }
    }
}

impl Payload for RequestPayload {
    fn unknown(values: Vec<Value>) -> Self {
        RequestPayload::Unknown(UnknownPayload { values })
    }

    fn encode_body(&self) -> Value {
        match self {
            RequestPayload::CreateSession(r) => named_body(CREATE_SESSION, r),
            RequestPayload::TransferSessionPif(r) => named_body(TRANSFER_SESSION_PIF_REQUEST, r),
            RequestPayload::SetSessionSystemInfo(r) => {
                // Legacy flat body: fields follow the name directly.
                let mut body = vec![Value::from(SET_SESSION_SYSTEM_INFO)];
                body.extend(r.fields());
                Value::Array(body)
            }
            RequestPayload::SetSessionUserInfo(r) => named_body(SET_SESSION_USER_INFO, r),
            RequestPayload::CreateBuild(r) => named_body(CREATE_BUILD, r),
            RequestPayload::BuildStart(r) => named_body(BUILD_START, r),
            RequestPayload::BuildCancel(r) => named_body(BUILD_CANCEL, r),
            RequestPayload::IndexingInfo(r) => named_body(INDEXING_INFO_REQUESTED, r),
            RequestPayload::PreviewInfo(r) => named_body(PREVIEW_INFO_REQUESTED, r),
            RequestPayload::Unknown(u) => Value::Array(u.values.clone()),
        }
    }
}

fn named_body(name: &str, payload: &impl EncodePayload) -> Value {
    Value::Array(vec![Value::from(name), payload.encode()])
}

fn decode_create_session(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::CreateSession(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_transfer_session_pif(
    values: &[Value],
    path: &Path,
) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::TransferSessionPif(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_set_session_system_info(
    values: &[Value],
    path: &Path,
) -> Result<RequestPayload, DecodeError> {
    // Legacy flat command: the sub-decoder consumes the whole body.
    Ok(RequestPayload::SetSessionSystemInfo(parse_object(
        values, path,
    )?))
}

fn decode_set_session_user_info(
    values: &[Value],
    path: &Path,
) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::SetSessionUserInfo(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_create_build(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::CreateBuild(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_create_build_legacy(
    values: &[Value],
    path: &Path,
) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::CreateBuild(CreateBuildRequest::decode_legacy(
        values,
        &path.child(1),
    )?))
}

fn decode_build_start(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::BuildStart(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_build_cancel(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::BuildCancel(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_indexing_info(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::IndexingInfo(parse_object(
        values,
        &path.child(1),
    )?))
}

fn decode_preview_info(values: &[Value], path: &Path) -> Result<RequestPayload, DecodeError> {
    Ok(RequestPayload::PreviewInfo(parse_object(
        values,
        &path.child(1),
    )?))
}

static V1_TABLE: LazyLock<DispatchTable<RequestPayload>> = LazyLock::new(|| {
    DispatchTable::new(&[
        (
            CREATE_SESSION,
            decode_create_session as CommandDecoder<RequestPayload>,
        ),
        (TRANSFER_SESSION_PIF_REQUEST, decode_transfer_session_pif),
        (SET_SESSION_SYSTEM_INFO, decode_set_session_system_info),
        (SET_SESSION_USER_INFO, decode_set_session_user_info),
        (CREATE_BUILD, decode_create_build_legacy),
        (BUILD_START, decode_build_start),
        (BUILD_CANCEL, decode_build_cancel),
        (INDEXING_INFO_REQUESTED, decode_indexing_info),
        (PREVIEW_INFO_REQUESTED, decode_preview_info),
    ])
});

static V2_TABLE: LazyLock<DispatchTable<RequestPayload>> = LazyLock::new(|| {
    DispatchTable::new(&[
        (
            CREATE_SESSION,
            decode_create_session as CommandDecoder<RequestPayload>,
        ),
        (TRANSFER_SESSION_PIF_REQUEST, decode_transfer_session_pif),
        (SET_SESSION_SYSTEM_INFO, decode_set_session_system_info),
        (SET_SESSION_USER_INFO, decode_set_session_user_info),
        (CREATE_BUILD, decode_create_build),
        (BUILD_START, decode_build_start),
        (BUILD_CANCEL, decode_build_cancel),
        (INDEXING_INFO_REQUESTED, decode_indexing_info),
        (PREVIEW_INFO_REQUESTED, decode_preview_info),
    ])
});

pub(crate) fn table_for(version: ProtocolVersion) -> &'static DispatchTable<RequestPayload> {
    match version {
        ProtocolVersion::V1 => &V1_TABLE,
        ProtocolVersion::V2 => &V2_TABLE,
    }
}
