//! Build operation lifecycle payloads (responses).

use buildlink_msgpack::Value;
use buildlink_rpc::{
    check_arity, parse_args, parse_string, parse_uint64, parse_unknown, DecodeError,
    DecodePayload, EncodePayload, Path,
};

/// Announces the build number assigned to a created build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCreated {
    pub build_number: u64,
}

impl DecodePayload for BuildCreated {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 1, path)?;

        Ok(Self {
            build_number: parse_uint64(args, &path.child(0))?,
        })
    }
}

impl EncodePayload for BuildCreated {
    fn encode(&self) -> Value {
        Value::Array(vec![Value::Uint(self.build_number)])
    }
}

/// Marks a build operation as running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStarted {
    pub build_number: u64,
}

impl DecodePayload for BuildStarted {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 1, path)?;

        Ok(Self {
            build_number: parse_uint64(args, &path.child(0))?,
        })
    }
}

impl EncodePayload for BuildStarted {
    fn encode(&self) -> Value {
        Value::Array(vec![Value::Uint(self.build_number)])
    }
}

/// Signals that pre-build preparation finished. Carries no fields; its
/// wire body is nil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOperationPreparationCompleted;

impl DecodePayload for BuildOperationPreparationCompleted {
    fn decode(_values: &[Value], _path: &Path) -> Result<Self, DecodeError> {
        Ok(Self)
    }
}

impl EncodePayload for BuildOperationPreparationCompleted {
    fn encode(&self) -> Value {
        Value::Nil
    }
}

/// One diagnostic emitted during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    /// e.g. "error", "warning", "note"
    pub kind: String,
    pub message: String,
    /// Source location, opaque to this layer.
    pub location: Value,
}

impl DecodePayload for BuildDiagnostic {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            kind: parse_string(args, &path.child(0))?,
            message: parse_string(args, &path.child(1))?,
            location: parse_unknown(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for BuildDiagnostic {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::from(self.kind.as_str()),
            Value::from(self.message.as_str()),
            self.location.clone(),
        ])
    }
}

/// Terminates a build operation, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOperationEnded {
    pub build_number: u64,
    /// Raw completion status code.
    pub status: u64,
    /// Build metrics, opaque to this layer.
    pub metrics: Value,
}

impl DecodePayload for BuildOperationEnded {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError> {
        let args = parse_args(values, path)?;
        check_arity(args, 3, path)?;

        Ok(Self {
            build_number: parse_uint64(args, &path.child(0))?,
            status: parse_uint64(args, &path.child(1))?,
            metrics: parse_unknown(args, &path.child(2))?,
        })
    }
}

impl EncodePayload for BuildOperationEnded {
    fn encode(&self) -> Value {
        Value::Array(vec![
            Value::Uint(self.build_number),
            Value::Uint(self.status),
            self.metrics.clone(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_payloads_roundtrip() {
        let created = BuildCreated { build_number: 7 };
        let values = vec![created.encode()];
        assert_eq!(
            BuildCreated::decode(&values, &Path::root().child(0)).unwrap(),
            created
        );

        let ended = BuildOperationEnded {
            build_number: 7,
            status: 0,
            metrics: Value::Map(Default::default()),
        };
        let values = vec![ended.encode()];
        assert_eq!(
            BuildOperationEnded::decode(&values, &Path::root().child(0)).unwrap(),
            ended
        );
    }

    #[test]
    fn preparation_completed_has_nil_body() {
        assert_eq!(BuildOperationPreparationCompleted.encode(), Value::Nil);
        // Decode accepts whatever the body carries.
        let decoded =
            BuildOperationPreparationCompleted::decode(&[Value::Nil], &Path::root()).unwrap();
        assert_eq!(decoded, BuildOperationPreparationCompleted);
    }

    #[test]
    fn diagnostic_keeps_location_opaque() {
        let diagnostic = BuildDiagnostic {
            kind: "warning".to_string(),
            message: "unused variable".to_string(),
            location: Value::Array(vec![Value::from("main.rs"), Value::Uint(14)]),
        };
        let values = vec![diagnostic.encode()];
        let decoded = BuildDiagnostic::decode(&values, &Path::root().child(0)).unwrap();
        assert_eq!(decoded, diagnostic);
    }
}
