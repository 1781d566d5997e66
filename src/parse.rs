//! Validating ingestion of loosely-typed JSON into message trees.
//!
//! A leaf whose JSON type does not match the declared type becomes absent; siblings are
//! unaffected. Enums accept either the value name or the numeric value.

use crate::assemble::{assemble, LeafOps};
use crate::descriptor::{EnumDescriptor, MessageDescriptor, PrimitiveType};
use crate::value::{Message, Value};
use serde_json::Value as Json;

/// Leaf behavior of parse: validate, replace, truncate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOps;

impl LeafOps<Json> for ParseOps {
    fn primitive(&self, source: Option<&Json>, primitive: PrimitiveType, _existing: Option<Value>) -> Option<Value> {
        parse_primitive(source?, primitive)
    }

    fn enumeration(&self, source: Option<&Json>, descriptor: &EnumDescriptor, _existing: Option<Value>) -> Option<Value> {
        parse_enum(source?, descriptor)
    }

    fn reset_array(&self, output: &mut Message, name: &str) {
        output.remove(name);
    }

    fn shrink_array(&self, output: &mut Vec<Option<Value>>, len: usize) {
        output.truncate(len);
    }
}

/// Primitive leaf from JSON; `None` on a type mismatch.
pub fn parse_primitive(raw: &Json, primitive: PrimitiveType) -> Option<Value> {
    match (primitive, raw) {
        (PrimitiveType::Number, Json::Number(n)) => n.as_f64().map(Value::Number),
        (PrimitiveType::Boolean, Json::Bool(b)) => Some(Value::Bool(*b)),
        (PrimitiveType::String, Json::String(s)) => Some(Value::String(s.clone())),
        _ => None,
    }
}

/// Enum leaf from a value name or a declared numeric value.
pub fn parse_enum(raw: &Json, descriptor: &EnumDescriptor) -> Option<Value> {
    let value = match raw {
        Json::String(name) => descriptor.value_of(name)?,
        Json::Number(n) => {
            let x = n.as_f64()?;
            if x.fract() != 0.0 || x < 0.0 || x > u32::MAX as f64 {
                return None;
            }
            x as u32
        }
        _ => return None,
    };
    descriptor.contains(value).then_some(Value::Enum(value))
}

/// Parse `raw` into a fresh message. `None` when `raw` is not a JSON object.
pub fn parse(raw: &Json, descriptor: &MessageDescriptor) -> Option<Message> {
    assemble::<Json, _>(&ParseOps, raw.as_object(), descriptor, None)
}

/// Parse `raw` into `output` in place. Returns `false` and leaves `output` untouched when
/// `raw` is not a JSON object.
pub fn parse_into(raw: &Json, descriptor: &MessageDescriptor, output: &mut Message) -> bool {
    let object = match raw.as_object() {
        Some(o) => o,
        None => return false,
    };
    let taken = std::mem::take(output);
    match assemble::<Json, _>(&ParseOps, Some(object), descriptor, Some(taken)) {
        Some(m) => {
            *output = m;
            true
        }
        None => false,
    }
}
