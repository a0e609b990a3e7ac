use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Extension type tag reserved for timestamps by the MessagePack spec.
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

/// One MessagePack datum in memory.
///
/// Equality, ordering and hashing are structural over the whole tree,
/// including nested arrays and maps, so values are usable as map keys.
/// Signed and unsigned integers denoting the same number compare equal
/// (`Value::Int(5) == Value::Uint(5)`): the codec encodes non-negative
/// integers with unsigned tags, and decoding hands them back as `Uint`.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    /// Signed integer, normalized to 64 bits.
    Int(i64),
    /// Unsigned integer, normalized to 64 bits.
    Uint(u64),
    Float32(f32),
    Float64(f64),
    /// UTF-8 text.
    String(String),
    /// Opaque byte sequence.
    Binary(Vec<u8>),
    Array(Vec<Value>),
    /// Unique-keyed map. Keys are full values; iteration follows the
    /// structural key ordering, which keeps `pack` deterministic.
    Map(BTreeMap<Value, Value>),
    /// Extension value with an application-defined type tag.
    ///
    /// Type tag [`TIMESTAMP_EXT_TYPE`] with a 4/8/12-byte payload is decoded
    /// as [`Value::Timestamp`] instead; construct that variant directly
    /// rather than hand-rolling timestamp payloads here.
    Extension(i8, Vec<u8>),
    /// The predefined timestamp extension.
    Timestamp(Timestamp),
}

/// Seconds and nanoseconds carried by the timestamp extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Seconds since the Unix epoch. May be negative.
    pub seconds: i64,
    /// Additional nanoseconds, `0..1_000_000_000`.
    pub nanoseconds: u32,
}

impl Timestamp {
    /// Create a timestamp. `nanoseconds` must be below one second.
    pub fn new(seconds: i64, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }
}

/// The variant of a [`Value`], used in decode diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    String,
    Binary,
    Array,
    Map,
    Extension,
    Timestamp,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Nil => "nil",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::String => "string",
            ValueKind::Binary => "binary",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::Extension => "extension",
            ValueKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The variant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Uint(_) => ValueKind::Uint,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Extension(_, _) => ValueKind::Extension,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Construct a binary value.
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Value::Binary(data.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// The value as an unsigned 64-bit integer. Non-negative signed
    /// integers narrow losslessly; anything else is `None`.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    /// The value as a signed 64-bit integer, if it fits.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Variant rank for cross-variant ordering. `Int` and `Uint` share a
    /// rank so that numerically equal integers are equal map keys.
    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Uint(_) => 2,
            Value::Float32(_) => 3,
            Value::Float64(_) => 4,
            Value::String(_) => 5,
            Value::Binary(_) => 6,
            Value::Array(_) => 7,
            Value::Map(_) => 8,
            Value::Extension(_, _) => 9,
            Value::Timestamp(_) => 10,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
            (Value::Int(a), Value::Uint(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Value::Uint(a), Value::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Value::Float32(a), Value::Float32(b)) => a.total_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            (Value::Extension(at, ad), Value::Extension(bt, bd)) => {
                at.cmp(bt).then_with(|| ad.cmp(bd))
            }
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Nil => state.write_u8(0),
            Value::Bool(v) => {
                state.write_u8(1);
                v.hash(state);
            }
            // Int and Uint hash through a shared domain, consistent with Eq.
            Value::Int(v) => {
                state.write_u8(2);
                i128::from(*v).hash(state);
            }
            Value::Uint(v) => {
                state.write_u8(2);
                i128::from(*v).hash(state);
            }
            Value::Float32(v) => {
                state.write_u8(3);
                v.to_bits().hash(state);
            }
            Value::Float64(v) => {
                state.write_u8(4);
                v.to_bits().hash(state);
            }
            Value::String(v) => {
                state.write_u8(5);
                v.hash(state);
            }
            Value::Binary(v) => {
                state.write_u8(6);
                v.hash(state);
            }
            Value::Array(v) => {
                state.write_u8(7);
                v.hash(state);
            }
            Value::Map(v) => {
                state.write_u8(8);
                v.hash(state);
            }
            Value::Extension(ext_type, data) => {
                state.write_u8(9);
                ext_type.hash(state);
                data.hash(state);
            }
            Value::Timestamp(v) => {
                state.write_u8(10);
                v.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(u64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(v: BTreeMap<Value, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Nil,
        }
    }
}
