//! Binary encode/decode for the history format.
//!
//! All integers are little-endian. Strings are length-prefixed with a `u32`
//! length. There is no compression or alignment padding; the schema at the
//! head of the stream is enough to interpret every record.

use std::io::{Read, Write};

use cadence_core::{FieldRank, Value};
use indexmap::IndexMap;

use crate::error::HistoryError;
use crate::types::{AxisSchema, Record, Schema, VariableSchema};
use crate::{FORMAT_VERSION, MAGIC};

const PARAM_NUMBER: u8 = 0;
const PARAM_TEXT: u8 = 1;

/// Upper bound on capacity reserved from a count read off the stream.
/// Larger collections grow as elements actually arrive.
const MAX_PREALLOC: usize = 1024;

fn capacity(n: usize) -> usize {
    n.min(MAX_PREALLOC)
}

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), HistoryError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), HistoryError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), HistoryError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), HistoryError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn write_len(w: &mut dyn Write, len: usize) -> Result<(), HistoryError> {
    let len = u32::try_from(len).map_err(|_| HistoryError::Malformed {
        detail: format!("length {len} exceeds u32"),
    })?;
    write_u32_le(w, len)
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, HistoryError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, HistoryError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian f32.
pub fn read_f32_le(r: &mut dyn Read) -> Result<f32, HistoryError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, HistoryError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, HistoryError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = Vec::with_capacity(capacity(len));
    let got = (&mut *r).take(len as u64).read_to_end(&mut buf)?;
    if got != len {
        return Err(HistoryError::Malformed {
            detail: format!("truncated string: got {got} of {len} bytes"),
        });
    }
    String::from_utf8(buf).map_err(|e| HistoryError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the file header (magic, version, schema).
pub fn encode_header(w: &mut dyn Write, schema: &Schema) -> Result<(), HistoryError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_len(w, schema.attributes.len())?;
    for (key, value) in &schema.attributes {
        write_length_prefixed_str(w, key)?;
        write_length_prefixed_str(w, value)?;
    }

    let params: Vec<_> = schema
        .params
        .iter()
        .filter(|(_, v)| matches!(v, Value::Scalar(_) | Value::Text(_)))
        .collect();
    write_len(w, params.len())?;
    for (name, value) in params {
        write_length_prefixed_str(w, name)?;
        match value {
            Value::Text(s) => {
                write_u8(w, PARAM_TEXT)?;
                write_length_prefixed_str(w, s)?;
            }
            other => {
                write_u8(w, PARAM_NUMBER)?;
                write_f64_le(w, other.as_scalar().unwrap_or(f64::NAN))?;
            }
        }
    }

    write_len(w, schema.axes.len())?;
    for axis in &schema.axes {
        write_length_prefixed_str(w, &axis.name)?;
        write_length_prefixed_str(w, &axis.long_name)?;
        write_length_prefixed_str(w, &axis.units)?;
        write_len(w, axis.values.len())?;
        for &v in &axis.values {
            write_f64_le(w, v)?;
        }
    }

    write_len(w, schema.variables.len())?;
    for var in &schema.variables {
        write_length_prefixed_str(w, &var.name)?;
        write_length_prefixed_str(w, &var.long_name)?;
        write_length_prefixed_str(w, &var.units)?;
        write_u8(w, rank_tag(var.rank))?;
    }
    Ok(())
}

/// Decode and validate the file header.
pub fn decode_header(r: &mut dyn Read) -> Result<Schema, HistoryError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(HistoryError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(HistoryError::UnsupportedVersion { found: version });
    }

    let n = read_u32_le(r)? as usize;
    let mut attributes = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        attributes.push((read_length_prefixed_str(r)?, read_length_prefixed_str(r)?));
    }

    let n = read_u32_le(r)? as usize;
    let mut params = IndexMap::with_capacity(capacity(n));
    for _ in 0..n {
        let name = read_length_prefixed_str(r)?;
        let value = match read_u8(r)? {
            PARAM_NUMBER => Value::Scalar(read_f64_le(r)?),
            PARAM_TEXT => Value::Text(read_length_prefixed_str(r)?),
            tag => {
                return Err(HistoryError::Malformed {
                    detail: format!("invalid parameter tag {tag} for '{name}'"),
                })
            }
        };
        params.insert(name, value);
    }

    let n = read_u32_le(r)? as usize;
    let mut axes = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        let name = read_length_prefixed_str(r)?;
        let long_name = read_length_prefixed_str(r)?;
        let units = read_length_prefixed_str(r)?;
        let len = read_u32_le(r)? as usize;
        let mut values = Vec::with_capacity(capacity(len));
        for _ in 0..len {
            values.push(read_f64_le(r)?);
        }
        axes.push(AxisSchema {
            name,
            long_name,
            units,
            values,
        });
    }

    let n = read_u32_le(r)? as usize;
    let mut variables = Vec::with_capacity(capacity(n));
    for _ in 0..n {
        let name = read_length_prefixed_str(r)?;
        let long_name = read_length_prefixed_str(r)?;
        let units = read_length_prefixed_str(r)?;
        let tag = read_u8(r)?;
        let rank = rank_from_tag(tag).ok_or_else(|| HistoryError::Malformed {
            detail: format!("invalid rank tag {tag} for variable '{name}'"),
        })?;
        variables.push(VariableSchema {
            name,
            long_name,
            units,
            rank,
        });
    }

    Ok(Schema {
        attributes,
        params,
        axes,
        variables,
    })
}

fn rank_tag(rank: FieldRank) -> u8 {
    match rank {
        FieldRank::Surface => 2,
        FieldRank::Column => 3,
    }
}

fn rank_from_tag(tag: u8) -> Option<FieldRank> {
    match tag {
        2 => Some(FieldRank::Surface),
        3 => Some(FieldRank::Column),
        _ => None,
    }
}

// ── Record encode/decode ────────────────────────────────────────

/// Encode a single record.
///
/// Every field must be declared in `schema` with a matching element count.
pub fn encode_record(
    w: &mut dyn Write,
    schema: &Schema,
    record: &Record,
) -> Result<(), HistoryError> {
    check_record(schema, record)?;
    encode_record_unchecked(w, record)
}

/// Encode a record without consulting a schema (used when appending to a
/// file whose schema was written by an earlier run).
pub fn encode_record_unchecked(w: &mut dyn Write, record: &Record) -> Result<(), HistoryError> {
    write_f64_le(w, record.time_days)?;
    write_f64_le(w, record.calday)?;
    write_len(w, record.fields.len())?;
    for (name, data) in &record.fields {
        write_length_prefixed_str(w, name)?;
        write_len(w, data.len())?;
        for &v in data {
            w.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Decode a single record.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), `Ok(Some(record))`
/// on success, or an error on truncated/corrupt data.
pub fn decode_record(r: &mut dyn Read, schema: &Schema) -> Result<Option<Record>, HistoryError> {
    // Read the time coordinate byte-by-byte to distinguish clean EOF
    // from truncation.
    let mut time_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut time_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(HistoryError::Malformed {
                    detail: format!("truncated record header: got {filled} of 8 bytes"),
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HistoryError::Io(e)),
        }
    }
    let time_days = f64::from_le_bytes(time_buf);
    let calday = read_f64_le(r)?;

    let n = read_u32_le(r)? as usize;
    let mut fields = IndexMap::with_capacity(capacity(n));
    for _ in 0..n {
        let name = read_length_prefixed_str(r)?;
        let len = read_u32_le(r)? as usize;
        let mut data = Vec::with_capacity(capacity(len));
        for _ in 0..len {
            data.push(read_f32_le(r)?);
        }
        fields.insert(name, data);
    }
    let record = Record {
        time_days,
        calday,
        fields,
    };
    check_record(schema, &record)?;
    Ok(Some(record))
}

fn check_record(schema: &Schema, record: &Record) -> Result<(), HistoryError> {
    for (name, data) in &record.fields {
        let var = schema
            .variable(name)
            .ok_or_else(|| HistoryError::UnknownVariable { name: name.clone() })?;
        let expected: usize = schema.shape_of(var.rank).iter().product();
        if data.len() != expected {
            return Err(HistoryError::Malformed {
                detail: format!(
                    "variable '{name}' has {} values, schema requires {expected}",
                    data.len()
                ),
            });
        }
    }
    Ok(())
}
