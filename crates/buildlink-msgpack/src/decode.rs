use std::collections::BTreeMap;

use crate::error::{Result, UnpackError};
use crate::value::{Timestamp, Value, TIMESTAMP_EXT_TYPE};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

// Containers can declare up to u32::MAX elements; cap the preallocation so
// a hostile header cannot reserve gigabytes before the buffer runs dry.
const MAX_PREALLOC: usize = 1024;

/// Parse exactly one value from the front of `data`.
///
/// Returns the decoded value and the unconsumed remainder, so back-to-back
/// values can be drained from one buffer. Decoding is width-preserving:
/// a 64-bit unsigned tag stays a 64-bit unsigned value and is only narrowed
/// (or rejected) by the typed decode layer above.
pub fn unpack(data: &[u8]) -> Result<(Value, &[u8])> {
    let (&tag, rest) = data.split_first().ok_or(UnpackError::InsufficientData)?;

    match tag {
        0x00..=0x7F => Ok((Value::Uint(u64::from(tag)), rest)),
        0x80..=0x8F => unpack_map(usize::from(tag & 0x0F), rest),
        0x90..=0x9F => unpack_array(usize::from(tag & 0x0F), rest),
        0xA0..=0xBF => unpack_str(usize::from(tag & 0x1F), rest),
        0xC0 => Ok((Value::Nil, rest)),
        0xC1 => Err(UnpackError::UnsupportedType(tag)),
        0xC2 => Ok((Value::Bool(false), rest)),
        0xC3 => Ok((Value::Bool(true), rest)),
        0xC4 => {
            let (len, rest) = read_u8(rest)?;
            unpack_bin(usize::from(len), rest)
        }
        0xC5 => {
            let (len, rest) = read_u16(rest)?;
            unpack_bin(usize::from(len), rest)
        }
        0xC6 => {
            let (len, rest) = read_u32(rest)?;
            unpack_bin(len as usize, rest)
        }
        0xC7 => {
            let (len, rest) = read_u8(rest)?;
            unpack_ext(usize::from(len), rest)
        }
        0xC8 => {
            let (len, rest) = read_u16(rest)?;
            unpack_ext(usize::from(len), rest)
        }
        0xC9 => {
            let (len, rest) = read_u32(rest)?;
            unpack_ext(len as usize, rest)
        }
        0xCA => {
            let (bits, rest) = read_u32(rest)?;
            Ok((Value::Float32(f32::from_bits(bits)), rest))
        }
        0xCB => {
            let (bits, rest) = read_u64(rest)?;
            Ok((Value::Float64(f64::from_bits(bits)), rest))
        }
        0xCC => {
            let (v, rest) = read_u8(rest)?;
            Ok((Value::Uint(u64::from(v)), rest))
        }
        0xCD => {
            let (v, rest) = read_u16(rest)?;
            Ok((Value::Uint(u64::from(v)), rest))
        }
        0xCE => {
            let (v, rest) = read_u32(rest)?;
            Ok((Value::Uint(u64::from(v)), rest))
        }
        0xCF => {
            let (v, rest) = read_u64(rest)?;
            Ok((Value::Uint(v), rest))
        }
        0xD0 => {
            let (v, rest) = read_u8(rest)?;
            Ok((Value::Int(i64::from(v as i8)), rest))
        }
        0xD1 => {
            let (v, rest) = read_u16(rest)?;
            Ok((Value::Int(i64::from(v as i16)), rest))
        }
        0xD2 => {
            let (v, rest) = read_u32(rest)?;
            Ok((Value::Int(i64::from(v as i32)), rest))
        }
        0xD3 => {
            let (v, rest) = read_u64(rest)?;
            Ok((Value::Int(v as i64), rest))
        }
        0xD4 => unpack_ext(1, rest),
        0xD5 => unpack_ext(2, rest),
        0xD6 => unpack_ext(4, rest),
        0xD7 => unpack_ext(8, rest),
        0xD8 => unpack_ext(16, rest),
        0xD9 => {
            let (len, rest) = read_u8(rest)?;
            unpack_str(usize::from(len), rest)
        }
        0xDA => {
            let (len, rest) = read_u16(rest)?;
            unpack_str(usize::from(len), rest)
        }
        0xDB => {
            let (len, rest) = read_u32(rest)?;
            unpack_str(len as usize, rest)
        }
        0xDC => {
            let (len, rest) = read_u16(rest)?;
            unpack_array(usize::from(len), rest)
        }
        0xDD => {
            let (len, rest) = read_u32(rest)?;
            unpack_array(len as usize, rest)
        }
        0xDE => {
            let (len, rest) = read_u16(rest)?;
            unpack_map(usize::from(len), rest)
        }
        0xDF => {
            let (len, rest) = read_u32(rest)?;
            unpack_map(len as usize, rest)
        }
        0xE0..=0xFF => Ok((Value::Int(i64::from(tag as i8)), rest)),
    }
}

fn take(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(UnpackError::InsufficientData);
    }
    Ok(data.split_at(len))
}

fn read_u8(data: &[u8]) -> Result<(u8, &[u8])> {
    let (bytes, rest) = take(data, 1)?;
    Ok((bytes[0], rest))
}

fn read_u16(data: &[u8]) -> Result<(u16, &[u8])> {
    let (bytes, rest) = take(data, 2)?;
    Ok((u16::from_be_bytes([bytes[0], bytes[1]]), rest))
}

fn read_u32(data: &[u8]) -> Result<(u32, &[u8])> {
    let (bytes, rest) = take(data, 4)?;
    Ok((u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), rest))
}

fn read_u64(data: &[u8]) -> Result<(u64, &[u8])> {
    let (bytes, rest) = take(data, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok((u64::from_be_bytes(raw), rest))
}

fn unpack_str(len: usize, data: &[u8]) -> Result<(Value, &[u8])> {
    let (bytes, rest) = take(data, len)?;
    let text = std::str::from_utf8(bytes).map_err(|_| UnpackError::InvalidData)?;
    Ok((Value::String(text.to_string()), rest))
}

fn unpack_bin(len: usize, data: &[u8]) -> Result<(Value, &[u8])> {
    let (bytes, rest) = take(data, len)?;
    Ok((Value::Binary(bytes.to_vec()), rest))
}

fn unpack_array(len: usize, data: &[u8]) -> Result<(Value, &[u8])> {
    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
    let mut rest = data;
    for _ in 0..len {
        let (item, tail) = unpack(rest)?;
        items.push(item);
        rest = tail;
    }
    Ok((Value::Array(items), rest))
}

fn unpack_map(len: usize, data: &[u8]) -> Result<(Value, &[u8])> {
    let mut entries = BTreeMap::new();
    let mut rest = data;
    for _ in 0..len {
        let (key, tail) = unpack(rest)?;
        let (val, tail) = unpack(tail)?;
        entries.insert(key, val);
        rest = tail;
    }
    Ok((Value::Map(entries), rest))
}

fn unpack_ext(len: usize, data: &[u8]) -> Result<(Value, &[u8])> {
    let (type_byte, rest) = read_u8(data)?;
    let ext_type = type_byte as i8;
    let (payload, rest) = take(rest, len)?;

    if ext_type == TIMESTAMP_EXT_TYPE {
        if let Some(ts) = unpack_timestamp(payload)? {
            return Ok((Value::Timestamp(ts), rest));
        }
    }

    Ok((Value::Extension(ext_type, payload.to_vec()), rest))
}

/// The three timestamp layouts from the MessagePack spec. Other payload
/// lengths under the timestamp type tag pass through as plain extensions.
fn unpack_timestamp(payload: &[u8]) -> Result<Option<Timestamp>> {
    match payload.len() {
        4 => {
            let (seconds, _) = read_u32(payload)?;
            Ok(Some(Timestamp::new(i64::from(seconds), 0)))
        }
        8 => {
            let (packed, _) = read_u64(payload)?;
            let nanoseconds = (packed >> 34) as u32;
            let seconds = (packed & 0x3_FFFF_FFFF) as i64;
            if nanoseconds >= NANOS_PER_SECOND {
                return Err(UnpackError::InvalidData);
            }
            Ok(Some(Timestamp::new(seconds, nanoseconds)))
        }
        12 => {
            let (nanoseconds, rest) = read_u32(payload)?;
            let (seconds, _) = read_u64(rest)?;
            if nanoseconds >= NANOS_PER_SECOND {
                return Err(UnpackError::InvalidData);
            }
            Ok(Some(Timestamp::new(seconds as i64, nanoseconds)))
        }
        _ => Ok(None),
    }
}
