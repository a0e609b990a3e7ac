use bytes::{BufMut, Bytes, BytesMut};

use crate::value::{Timestamp, Value, TIMESTAMP_EXT_TYPE};

/// Encode one value into its canonical MessagePack form.
///
/// Total and deterministic. Always selects the smallest encoding that
/// losslessly holds the value; peers are allowed to reject oversized
/// encodings, so this is part of the wire contract, not a size tweak.
pub fn pack(value: &Value) -> Bytes {
    let mut buf = BytesMut::new();
    pack_into(value, &mut buf);
    buf.freeze()
}

/// Encode one value, appending to `buf`.
pub fn pack_into(value: &Value, buf: &mut BytesMut) {
    match value {
        Value::Nil => buf.put_u8(0xC0),
        Value::Bool(false) => buf.put_u8(0xC2),
        Value::Bool(true) => buf.put_u8(0xC3),
        Value::Uint(v) => pack_uint(*v, buf),
        Value::Int(v) => pack_int(*v, buf),
        Value::Float32(v) => {
            buf.put_u8(0xCA);
            buf.put_f32(*v);
        }
        Value::Float64(v) => {
            buf.put_u8(0xCB);
            buf.put_f64(*v);
        }
        Value::String(s) => {
            pack_str_header(s.len(), buf);
            buf.put_slice(s.as_bytes());
        }
        Value::Binary(data) => {
            pack_bin_header(data.len(), buf);
            buf.put_slice(data);
        }
        Value::Array(items) => {
            pack_array_header(items.len(), buf);
            for item in items {
                pack_into(item, buf);
            }
        }
        Value::Map(entries) => {
            pack_map_header(entries.len(), buf);
            for (key, val) in entries {
                pack_into(key, buf);
                pack_into(val, buf);
            }
        }
        Value::Extension(ext_type, data) => pack_ext(*ext_type, data, buf),
        Value::Timestamp(ts) => pack_timestamp(*ts, buf),
    }
}

/// Non-negative integers always take the unsigned encodings; 0..=127 is a
/// single positive-fixint byte.
fn pack_uint(v: u64, buf: &mut BytesMut) {
    if v <= 0x7F {
        buf.put_u8(v as u8);
    } else if v <= 0xFF {
        buf.put_u8(0xCC);
        buf.put_u8(v as u8);
    } else if v <= 0xFFFF {
        buf.put_u8(0xCD);
        buf.put_u16(v as u16);
    } else if v <= 0xFFFF_FFFF {
        buf.put_u8(0xCE);
        buf.put_u32(v as u32);
    } else {
        buf.put_u8(0xCF);
        buf.put_u64(v);
    }
}

fn pack_int(v: i64, buf: &mut BytesMut) {
    if v >= 0 {
        pack_uint(v as u64, buf);
    } else if v >= -32 {
        buf.put_u8(v as i8 as u8);
    } else if v >= i64::from(i8::MIN) {
        buf.put_u8(0xD0);
        buf.put_i8(v as i8);
    } else if v >= i64::from(i16::MIN) {
        buf.put_u8(0xD1);
        buf.put_i16(v as i16);
    } else if v >= i64::from(i32::MIN) {
        buf.put_u8(0xD2);
        buf.put_i32(v as i32);
    } else {
        buf.put_u8(0xD3);
        buf.put_i64(v);
    }
}

fn pack_str_header(len: usize, buf: &mut BytesMut) {
    if len < 32 {
        buf.put_u8(0xA0 | len as u8);
    } else if len <= 0xFF {
        buf.put_u8(0xD9);
        buf.put_u8(len as u8);
    } else if len <= 0xFFFF {
        buf.put_u8(0xDA);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(0xDB);
        buf.put_u32(len as u32);
    }
}

fn pack_bin_header(len: usize, buf: &mut BytesMut) {
    if len <= 0xFF {
        buf.put_u8(0xC4);
        buf.put_u8(len as u8);
    } else if len <= 0xFFFF {
        buf.put_u8(0xC5);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(0xC6);
        buf.put_u32(len as u32);
    }
}

fn pack_array_header(len: usize, buf: &mut BytesMut) {
    if len < 16 {
        buf.put_u8(0x90 | len as u8);
    } else if len <= 0xFFFF {
        buf.put_u8(0xDC);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(0xDD);
        buf.put_u32(len as u32);
    }
}

fn pack_map_header(len: usize, buf: &mut BytesMut) {
    if len < 16 {
        buf.put_u8(0x80 | len as u8);
    } else if len <= 0xFFFF {
        buf.put_u8(0xDE);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(0xDF);
        buf.put_u32(len as u32);
    }
}

fn pack_ext(ext_type: i8, data: &[u8], buf: &mut BytesMut) {
    match data.len() {
        1 => buf.put_u8(0xD4),
        2 => buf.put_u8(0xD5),
        4 => buf.put_u8(0xD6),
        8 => buf.put_u8(0xD7),
        16 => buf.put_u8(0xD8),
        len if len <= 0xFF => {
            buf.put_u8(0xC7);
            buf.put_u8(len as u8);
        }
        len if len <= 0xFFFF => {
            buf.put_u8(0xC8);
            buf.put_u16(len as u16);
        }
        len => {
            buf.put_u8(0xC9);
            buf.put_u32(len as u32);
        }
    }
    buf.put_i8(ext_type);
    buf.put_slice(data);
}

/// Timestamps take the smallest of the three spec layouts: 32-bit seconds,
/// 64-bit packed nanoseconds+seconds, or the full 96-bit form.
fn pack_timestamp(ts: Timestamp, buf: &mut BytesMut) {
    let Timestamp {
        seconds,
        nanoseconds,
    } = ts;

    if nanoseconds == 0 && (0..=i64::from(u32::MAX)).contains(&seconds) {
        buf.put_u8(0xD6);
        buf.put_i8(TIMESTAMP_EXT_TYPE);
        buf.put_u32(seconds as u32);
    } else if (0..1i64 << 34).contains(&seconds) {
        let packed = (u64::from(nanoseconds) << 34) | seconds as u64;
        buf.put_u8(0xD7);
        buf.put_i8(TIMESTAMP_EXT_TYPE);
        buf.put_u64(packed);
    } else {
        buf.put_u8(0xC7);
        buf.put_u8(12);
        buf.put_i8(TIMESTAMP_EXT_TYPE);
        buf.put_u32(nanoseconds);
        buf.put_i64(seconds);
    }
}
