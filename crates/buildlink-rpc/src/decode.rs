//! Structured decode framework.
//!
//! Operates on an already-decoded container of values plus a [`Path`]
//! locating it within the enclosing message. Every accessor confirms the
//! element at the path's terminal index has the expected variant and
//! returns the native scalar, or fails with an error naming the expected
//! type and the exact path.
//!
//! Payload types validate arity first via [`check_arity`], then decode
//! fields positionally: one early, precisely located failure instead of a
//! cascade of mis-field errors.

use buildlink_msgpack::{Value, ValueKind};

use crate::error::DecodeError;
use crate::path::Path;

/// A type that can build itself from a values-container and a path.
///
/// `values` is the container *enclosing* the value being decoded; the
/// path's terminal index locates it. Array-shaped payloads start with
/// [`parse_args`] + [`check_arity`]; scalar-shaped payloads read their
/// single element directly (e.g. via [`parse_string`]).
pub trait DecodePayload: Sized {
    fn decode(values: &[Value], path: &Path) -> Result<Self, DecodeError>;
}

/// A type that can re-encode itself into a value.
pub trait EncodePayload {
    fn encode(&self) -> Value;
}

fn element<'a>(values: &'a [Value], path: &Path) -> Result<&'a Value, DecodeError> {
    let index = path.last().ok_or_else(|| DecodeError::IndexOutOfBounds {
        path: path.clone(),
    })?;
    values.get(index).ok_or_else(|| DecodeError::IndexOutOfBounds {
        path: path.clone(),
    })
}

/// The string at the path's terminal index.
pub fn parse_string(values: &[Value], path: &Path) -> Result<String, DecodeError> {
    match element(values, path)? {
        Value::String(text) => Ok(text.clone()),
        _ => Err(DecodeError::IncorrectValueType {
            path: path.clone(),
            expected: ValueKind::String,
        }),
    }
}

/// The string at the path's terminal index, where an explicit `nil` means
/// present-but-absent. A missing element is still an error, which keeps
/// "field present as nil" distinct from "field missing".
pub fn parse_optional_string(values: &[Value], path: &Path) -> Result<Option<String>, DecodeError> {
    match element(values, path)? {
        Value::Nil => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        _ => Err(DecodeError::IncorrectValueType {
            path: path.clone(),
            expected: ValueKind::String,
        }),
    }
}

/// The bool at the path's terminal index.
pub fn parse_bool(values: &[Value], path: &Path) -> Result<bool, DecodeError> {
    match element(values, path)? {
        Value::Bool(v) => Ok(*v),
        _ => Err(DecodeError::IncorrectValueType {
            path: path.clone(),
            expected: ValueKind::Bool,
        }),
    }
}

/// The unsigned 64-bit integer at the path's terminal index. Non-negative
/// signed values narrow losslessly; a negative value is a type error, not
/// a silent truncation.
pub fn parse_uint64(values: &[Value], path: &Path) -> Result<u64, DecodeError> {
    let value = element(values, path)?;
    value.as_uint().ok_or_else(|| DecodeError::IncorrectValueType {
        path: path.clone(),
        expected: ValueKind::Uint,
    })
}

/// Decode the nested object at the path into `T`.
///
/// The capability trait receives the same enclosing container and path, so
/// the framework needs no knowledge of `T`'s shape.
pub fn parse_object<T: DecodePayload>(values: &[Value], path: &Path) -> Result<T, DecodeError> {
    T::decode(values, path)
}

/// Pass the value at the path through untyped, for fields whose shape is
/// opaque to this protocol layer.
pub fn parse_unknown(values: &[Value], path: &Path) -> Result<Value, DecodeError> {
    element(values, path).cloned()
}

/// The argument array at the path's terminal index.
pub fn parse_args<'a>(values: &'a [Value], path: &Path) -> Result<&'a [Value], DecodeError> {
    match element(values, path)? {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::IncorrectValueType {
            path: path.clone(),
            expected: ValueKind::Array,
        }),
    }
}

/// Reject a fixed-arity argument array with the wrong element count.
/// Called before any field-level parsing.
pub fn check_arity(args: &[Value], expected: usize, path: &Path) -> Result<(), DecodeError> {
    if args.len() != expected {
        return Err(DecodeError::InvalidCount {
            actual: args.len(),
            expected,
            path: path.clone(),
        });
    }
    Ok(())
}
