//! Session lifecycle payloads.

use buildlink_msgpack::Value;
use buildlink_rpc::{
    check_arity, parse_args, parse_optional_string, parse_string, parse_uint64, parse_unknown,
    DecodeError, DecodePayload, EncodePayload, Path,
};

/// Opens a session for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub name: String,
    pub app_path: String,
    pub cache_path: String,
    pub inferior_products_path: Option<String>,
}

impl DecodePayload for CreateSessionRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 4, path)?;

        Ok(Self {
            name: parse_string(args, &path.child(0))?,
            app_path: parse_string(args, &path.child(1))?,
            cache_path: parse_string(args, &path.child(2))?,
            inferior_products_path: parse_optional_string(args, &path.child(3))?,
        })
    }
}

impl EncodePayload for CreateSessionRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.name.as_str()),
            Value::from(self.app_path.as_str()),
            Value::from(self.cache_path.as_str()),
            Value::from(self.inferior_products_path.clone()),
        ])
    }
}

/// Transfers the session's project interchange data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSessionPifRequest {
    pub session_handle: String,
    pub workspace_signature: String,
}

impl DecodePayload for TransferSessionPifRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 2, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            workspace_signature: parse_string(args, &path.child(1))?,
        })
    }
}

impl EncodePayload for TransferSessionPifRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            Value::from(self.workspace_signature.as_str()),
        ])
    }
}

/// Records the host system description for a session.
///
/// One of the legacy flat commands: the fields follow the command name
/// directly in the body instead of sitting in a nested argument array, so
/// the decoder receives the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSessionSystemInfoRequest {
    pub session_handle: String,
    pub os_version: String,
    pub os_build_number: String,
    /// Host hardware description, opaque to this layer.
    pub machine_info: Value,
}

impl DecodePayload for SetSessionSystemInfoRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        Ok(Self {
            session_handle: parse_string(values, &path.child(1))?,
            os_version: parse_string(values, &path.child(2))?,
            os_build_number: parse_string(values, &path.child(3))?,
            machine_info: parse_unknown(values, &path.child(4))?,
        })
    }
}

impl SetSessionSystemInfoRequest {
    /// Body elements after the command name, in wire order.
    pub(crate) fn fields(&self) -> Vec<Value> {
        vec![
            Value::from(self.session_handle.as_str()),
            Value::from(self.os_version.as_str()),
            Value::from(self.os_build_number.as_str()),
            self.machine_info.clone(),
        ]
    }
}

/// Records the requesting user and group for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSessionUserInfoRequest {
    pub user: String,
    pub group: String,
    pub uid: u64,
    pub gid: u64,
}

impl DecodePayload for SetSessionUserInfoRequest {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 4, path)?;

        Ok(Self {
            user: parse_string(args, &path.child(0))?,
            group: parse_string(args, &path.child(1))?,
            uid: parse_uint64(args, &path.child(2))?,
            gid: parse_uint64(args, &path.child(3))?,
        })
    }
}

impl EncodePayload for SetSessionUserInfoRequest {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.user.as_str()),
            Value::from(self.group.as_str()),
            Value::Uint(self.uid),
            Value::Uint(self.gid),
        ])
    }
}

/// Confirms a created session and hands back its handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCreated {
    pub session_handle: String,
    /// Setup diagnostics, opaque to this layer.
    pub diagnostics: Value,
}

impl DecodePayload for SessionCreated {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 2, path)?;

        Ok(Self {
            session_handle: parse_string(args, &path.child(0))?,
            diagnostics: parse_unknown(args, &path.child(1))?,
        })
    }
}

impl EncodePayload for SessionCreated {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.session_handle.as_str()),
            self.diagnostics.clone(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_roundtrip() {
        let request = CreateSessionRequest {
            name: "MyApp".to_string(),
            app_path: "/ide/App.app".to_string(),
            cache_path: "/var/cache/sessions".to_string(),
            inferior_products_path: None,
        };

        let values = vec![Value::Nil, request.encode()];
        let decoded =
            CreateSessionRequest::decode(&values, &Path::root().child(1)).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn create_session_optional_path_present() {
        let values = vec![Value::Array(vec![
            Value::from("n"),
            Value::from("/a"),
            Value::from("/c"),
            Value::from("/products"),
        ])];
        let decoded = CreateSessionRequest::decode(&values, &Path::root().child(0)).unwrap();
        assert_eq!(decoded.inferior_products_path.as_deref(), Some("/products"));
    }

    #[test]
    fn create_session_wrong_arity_fails_before_fields() {
        let values = vec![Value::Array(vec![Value::Uint(1), Value::Uint(2)])];
        let err = CreateSessionRequest::decode(&values, &Path::root().child(0)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidCount {
                actual: 2,
                expected: 4,
                path: Path::from([0]),
            }
        );
    }

    #[test]
    fn user_info_field_paths() {
        let values = vec![
            Value::Nil,
            Value::Array(vec![
                Value::from("builder"),
                Value::from("staff"),
                Value::from("not-a-uid"),
                Value::Uint(20),
            ]),
        ];
        let err =
            SetSessionUserInfoRequest::decode(&values, &Path::root().child(1)).unwrap_err();
        assert_eq!(
            err,
            DecodeError::IncorrectValueType {
                path: Path::from([1, 2]),
                expected: buildlink_msgpack::ValueKind::Uint,
            }
        );
    }

    #[test]
    fn system_info_reads_flat_body() {
        let body = vec![
            Value::from("SET_SESSION_SYSTEM_INFO"),
            Value::from("handle-1"),
            Value::from("14.2"),
            Value::from("23C64"),
            Value::Map(Default::default()),
        ];
        let decoded = SetSessionSystemInfoRequest::decode(&body, &Path::root()).unwrap();
        assert_eq!(decoded.session_handle, "handle-1");
        assert_eq!(decoded.os_build_number, "23C64");
        assert_eq!(decoded.fields().len(), 4);
    }
}
