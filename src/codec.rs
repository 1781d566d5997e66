//! Binary wire codec.
//!
//! Fields are keyed by wire index, never by name, and absent fields are omitted. All
//! integers are little-endian.
//!
//! ```text
//! message := u32 field_count, field*          (field_count = 0xFFFFFFFF: absent message)
//! field   := u32 index, value                 (scalar)
//!          | u32 index, u32 count, value*     (repeated)
//! value   := f64                              number, NaN = absent
//!          | u8                               bool, 0 / 1, 2 = absent
//!          | u32 len, utf8[len]               string, len = 0xFFFFFFFF = absent
//!          | u32                              enum, 0 = absent or unknown
//!          | message                          nested
//! ```
//!
//! Absent elements of a repeated field keep their position through the per-type sentinels.
//! A legitimate NaN number is indistinguishable from absence after a round trip.
//!
//! Encoding goes through the fixed-capacity scratch buffer owned by a [`BinaryCodec`];
//! overrunning it fails with [`CodecError::CapacityExceeded`] and no bytes are returned.
//! Decoding only reads inside the given slice and fails with [`CodecError::UnexpectedEof`]
//! on truncated input. An index in the byte stream that the descriptor does not declare is
//! a hard [`CodecError::UnknownIndex`] error.

use crate::descriptor::{FieldType, MessageDescriptor, MessageField, PrimitiveType};
use crate::value::{Message, Value};
use byteorder::{ByteOrder, LittleEndian};
use std::cell::RefCell;

/// Default scratch buffer capacity (16 MiB).
pub const DEFAULT_CAPACITY: usize = 16 * 1024 * 1024;

const UINT32_ABSENT: u32 = u32::MAX;
const BOOL_ABSENT: u8 = 2;
const ENUM_ABSENT: u32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("scratch buffer capacity exceeded: need {needed} bytes, capacity {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },
    #[error("unexpected eof at offset {at}, need {need} bytes, remaining {remaining}")]
    UnexpectedEof {
        at: usize,
        need: usize,
        remaining: usize,
    },
    #[error("index {index} is not found in the message descriptor of {message}")]
    UnknownIndex { index: u32, message: String },
    #[error("{what} {len} exceeds the wire limit {max}")]
    LengthOverflow {
        what: &'static str,
        len: usize,
        max: u64,
    },
}

/// Binary encoder owning its scratch buffer.
///
/// One encode at a time per codec; results are copied out of the scratch buffer, so the
/// returned bytes stay valid across later calls.
#[derive(Debug)]
pub struct BinaryCodec {
    scratch: Vec<u8>,
}

impl Default for BinaryCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryCodec {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_bytes: usize) -> Self {
        BinaryCodec {
            scratch: vec![0u8; max_bytes],
        }
    }

    /// Maximum encoded size.
    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Replace the scratch buffer with one of `max_bytes`.
    pub fn set_capacity(&mut self, max_bytes: usize) {
        tracing::debug!(from = self.scratch.len(), to = max_bytes, "resizing scratch buffer");
        self.scratch = vec![0u8; max_bytes];
    }

    /// Encode `message`; `None` encodes the absent-message sentinel.
    pub fn serialize(&mut self, message: Option<&Message>, descriptor: &MessageDescriptor) -> Result<Vec<u8>, CodecError> {
        let mut w = ScratchWriter::new(&mut self.scratch);
        encode_message(&mut w, message, descriptor)?;
        let n = w.position();
        tracing::trace!(descriptor = descriptor.name(), bytes = n, "serialized");
        Ok(self.scratch[..n].to_vec())
    }
}

/// Decode a message; `None` input or an absent-message sentinel yields `None`.
pub fn deserialize(bytes: Option<&[u8]>, descriptor: &MessageDescriptor) -> Result<Option<Message>, CodecError> {
    let bytes = match bytes {
        Some(b) => b,
        None => return Ok(None),
    };
    let mut r = Reader::new(bytes);
    let message = decode_message(&mut r, descriptor)?;
    tracing::trace!(descriptor = descriptor.name(), bytes = r.position(), "deserialized");
    Ok(message)
}

thread_local! {
    static SCRATCH: RefCell<Option<BinaryCodec>> = const { RefCell::new(None) };
}

/// Encode with this thread's shared codec (allocated on first use, [`DEFAULT_CAPACITY`]).
pub fn serialize_binary(message: Option<&Message>, descriptor: &MessageDescriptor) -> Result<Vec<u8>, CodecError> {
    SCRATCH.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.get_or_insert_with(BinaryCodec::new)
            .serialize(message, descriptor)
    })
}

/// Same as [`deserialize`]; decoding never touches the scratch buffer.
pub fn deserialize_binary(bytes: Option<&[u8]>, descriptor: &MessageDescriptor) -> Result<Option<Message>, CodecError> {
    deserialize(bytes, descriptor)
}

/// Set the output ceiling of this thread's shared codec.
pub fn set_scratch_buffer_capacity(max_bytes: usize) {
    SCRATCH.with(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_mut() {
            Some(codec) => codec.set_capacity(max_bytes),
            None => *slot = Some(BinaryCodec::with_capacity(max_bytes)),
        }
    })
}

struct ScratchWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ScratchWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        ScratchWriter { buf, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn reserve(&mut self, n: usize) -> Result<&mut [u8], CodecError> {
        let capacity = self.buf.len();
        let end = match self.pos.checked_add(n) {
            Some(end) if end <= capacity => end,
            _ => {
                return Err(CodecError::CapacityExceeded {
                    needed: self.pos.saturating_add(n),
                    capacity,
                })
            }
        };
        let start = self.pos;
        self.pos = end;
        Ok(&mut self.buf[start..end])
    }

    fn write_u8(&mut self, v: u8) -> Result<(), CodecError> {
        self.reserve(1)?[0] = v;
        Ok(())
    }

    fn write_u32(&mut self, v: u32) -> Result<(), CodecError> {
        LittleEndian::write_u32(self.reserve(4)?, v);
        Ok(())
    }

    fn write_f64(&mut self, v: f64) -> Result<(), CodecError> {
        LittleEndian::write_f64(self.reserve(8)?, v);
        Ok(())
    }

    fn write_bytes(&mut self, b: &[u8]) -> Result<(), CodecError> {
        self.reserve(b.len())?.copy_from_slice(b);
        Ok(())
    }

    /// Overwrite a u32 at an offset already written.
    fn patch_u32(&mut self, at: usize, v: u32) {
        LittleEndian::write_u32(&mut self.buf[at..at + 4], v);
    }
}

fn wire_len(what: &'static str, len: usize, max: u32) -> Result<u32, CodecError> {
    match u32::try_from(len) {
        Ok(n) if n <= max => Ok(n),
        _ => Err(CodecError::LengthOverflow {
            what,
            len,
            max: max as u64,
        }),
    }
}

fn matches_type(v: &Value, field_type: &FieldType) -> bool {
    matches!(
        (field_type, v),
        (FieldType::Primitive(PrimitiveType::Number), Value::Number(_))
            | (FieldType::Primitive(PrimitiveType::Boolean), Value::Bool(_))
            | (FieldType::Primitive(PrimitiveType::String), Value::String(_))
            | (FieldType::Enum(_), Value::Enum(_))
            | (FieldType::Message(_), Value::Message(_))
    )
}

fn encode_message(w: &mut ScratchWriter<'_>, message: Option<&Message>, descriptor: &MessageDescriptor) -> Result<(), CodecError> {
    let message = match message {
        Some(m) => m,
        None => return w.write_u32(UINT32_ABSENT),
    };
    let count_at = w.position();
    w.write_u32(0)?;
    let mut count: u32 = 0;
    for f in descriptor.fields() {
        let v = match message.get(&f.name) {
            Some(v) => v,
            None => continue,
        };
        if f.repeated {
            let items = match v.as_list() {
                Some(l) => l,
                None => continue,
            };
            w.write_u32(f.index)?;
            w.write_u32(wire_len("array length", items.len(), u32::MAX)?)?;
            for item in items {
                encode_value(w, item.as_ref(), f)?;
            }
        } else {
            if !matches_type(v, &f.field_type) {
                continue;
            }
            w.write_u32(f.index)?;
            encode_value(w, Some(v), f)?;
        }
        count += 1;
    }
    w.patch_u32(count_at, count);
    Ok(())
}

fn encode_value(w: &mut ScratchWriter<'_>, v: Option<&Value>, field: &MessageField) -> Result<(), CodecError> {
    match &field.field_type {
        FieldType::Primitive(PrimitiveType::Number) => w.write_f64(v.and_then(Value::as_f64).unwrap_or(f64::NAN)),
        FieldType::Primitive(PrimitiveType::Boolean) => w.write_u8(match v.and_then(Value::as_bool) {
            Some(true) => 1,
            Some(false) => 0,
            None => BOOL_ABSENT,
        }),
        FieldType::Primitive(PrimitiveType::String) => match v.and_then(Value::as_str) {
            Some(s) => {
                w.write_u32(wire_len("string byte length", s.len(), UINT32_ABSENT - 1)?)?;
                w.write_bytes(s.as_bytes())
            }
            None => w.write_u32(UINT32_ABSENT),
        },
        FieldType::Enum(e) => w.write_u32(
            v.and_then(Value::as_enum)
                .filter(|n| e.contains(*n))
                .unwrap_or(ENUM_ABSENT),
        ),
        FieldType::Message(d) => encode_message(w, v.and_then(Value::as_message), d),
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                at: self.pos,
                need: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }
}

fn decode_message(r: &mut Reader<'_>, descriptor: &MessageDescriptor) -> Result<Option<Message>, CodecError> {
    let count = r.read_u32()?;
    if count == UINT32_ABSENT {
        return Ok(None);
    }
    let fields = descriptor.fields();
    let mut message = descriptor.new_message();
    // Fields ascend by index, so matching is one forward scan.
    let mut i = 0;
    for _ in 0..count {
        let index = r.read_u32()?;
        while i < fields.len() && fields[i].index < index {
            i += 1;
        }
        let field = match fields.get(i) {
            Some(f) if f.index == index => f,
            _ => {
                return Err(CodecError::UnknownIndex {
                    index,
                    message: descriptor.name().to_string(),
                })
            }
        };
        if field.repeated {
            let len = r.read_u32()? as usize;
            let mut items = Vec::with_capacity(len.min(r.remaining()));
            for _ in 0..len {
                items.push(decode_value(r, field)?);
            }
            message.insert(&field.name, Value::List(items));
        } else {
            message.set(&field.name, decode_value(r, field)?);
        }
    }
    Ok(Some(message))
}

fn decode_value(r: &mut Reader<'_>, field: &MessageField) -> Result<Option<Value>, CodecError> {
    Ok(match &field.field_type {
        FieldType::Primitive(PrimitiveType::Number) => {
            let x = r.read_f64()?;
            (!x.is_nan()).then_some(Value::Number(x))
        }
        FieldType::Primitive(PrimitiveType::Boolean) => match r.read_u8()? {
            BOOL_ABSENT => None,
            0 => Some(Value::Bool(false)),
            _ => Some(Value::Bool(true)),
        },
        FieldType::Primitive(PrimitiveType::String) => {
            let len = r.read_u32()?;
            if len == UINT32_ABSENT {
                None
            } else {
                let bytes = r.take(len as usize)?;
                Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))
            }
        }
        FieldType::Enum(e) => {
            let n = r.read_u32()?;
            e.contains(n).then_some(Value::Enum(n))
        }
        FieldType::Message(d) => decode_message(r, d)?.map(Value::Message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_rejects_overrun_without_advancing() {
        let mut buf = [0u8; 6];
        let mut w = ScratchWriter::new(&mut buf);
        w.write_u32(7).unwrap();
        let err = w.write_u32(8).unwrap_err();
        assert!(matches!(err, CodecError::CapacityExceeded { needed: 8, capacity: 6 }));
        assert_eq!(w.position(), 4);
    }

    #[test]
    fn reader_reports_eof_position() {
        let data = [1u8, 0, 0];
        let mut r = Reader::new(&data);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof { at: 0, need: 4, remaining: 3 }));
    }

    #[test]
    fn wire_len_reserves_string_sentinel() {
        assert!(wire_len("string byte length", u32::MAX as usize, UINT32_ABSENT - 1).is_err());
        assert_eq!(wire_len("array length", 3, u32::MAX).unwrap(), 3);
    }
}
