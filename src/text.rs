//! Index-keyed JSON codec.
//!
//! Same index-instead-of-name discipline as the [binary codec](crate::codec), but using
//! JSON's own type tags: `{"1":12,"2":true,"5":[11,null,855]}`. Absent list elements are
//! `null`.
//!
//! Decoding is lenient where the binary codec is strict: keys that match no declared
//! index are skipped, and mistyped leaves read as absent, exactly like
//! [`parse`](crate::parse::parse).

use crate::descriptor::{FieldType, MessageDescriptor, MessageField, PrimitiveType};
use crate::parse::{parse_enum, parse_primitive};
use crate::value::{json_number, Message, Value};
use serde_json::{Map as JsonMap, Value as Json};

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Index-keyed JSON object for `message`.
pub fn to_indexed(message: &Message, descriptor: &MessageDescriptor) -> Json {
    let mut out = JsonMap::new();
    for f in descriptor.fields() {
        let v = match message.get(&f.name) {
            Some(v) => v,
            None => continue,
        };
        let encoded = if f.repeated {
            v.as_list().map(|items| {
                Json::Array(
                    items
                        .iter()
                        .map(|e| e.as_ref().and_then(|e| indexed_value(e, f)).unwrap_or(Json::Null))
                        .collect(),
                )
            })
        } else {
            indexed_value(v, f)
        };
        if let Some(encoded) = encoded {
            out.insert(f.index.to_string(), encoded);
        }
    }
    Json::Object(out)
}

/// Leaf or nested value; `None` when `v` does not have the declared type.
fn indexed_value(v: &Value, field: &MessageField) -> Option<Json> {
    match (&field.field_type, v) {
        (FieldType::Primitive(PrimitiveType::Number), Value::Number(x)) => Some(json_number(*x)),
        (FieldType::Primitive(PrimitiveType::Boolean), Value::Bool(b)) => Some(Json::Bool(*b)),
        (FieldType::Primitive(PrimitiveType::String), Value::String(s)) => Some(Json::String(s.clone())),
        (FieldType::Enum(_), Value::Enum(n)) => Some(Json::from(*n)),
        (FieldType::Message(d), Value::Message(m)) => Some(to_indexed(m, d)),
        _ => None,
    }
}

/// Message from an index-keyed JSON object. `None` when `indexed` is not an object.
pub fn from_indexed(indexed: &Json, descriptor: &MessageDescriptor) -> Option<Message> {
    let object = indexed.as_object()?;
    if tracing::enabled!(tracing::Level::TRACE) {
        for key in object.keys() {
            let declared = key
                .parse::<u32>()
                .ok()
                .and_then(|i| descriptor.field_by_index(i))
                .is_some();
            if !declared {
                tracing::trace!(descriptor = descriptor.name(), key = %key, "skipping unknown index");
            }
        }
    }
    let mut message = descriptor.new_message();
    for f in descriptor.fields() {
        let raw = object.get(&f.index.to_string()).filter(|v| !v.is_null());
        if !f.repeated {
            message.set(&f.name, raw.and_then(|raw| indexed_leaf(raw, f)));
            continue;
        }
        if let Some(items) = raw.and_then(Json::as_array) {
            let list = items
                .iter()
                .map(|e| if e.is_null() { None } else { indexed_leaf(e, f) })
                .collect();
            message.insert(&f.name, Value::List(list));
        }
    }
    Some(message)
}

fn indexed_leaf(raw: &Json, field: &MessageField) -> Option<Value> {
    match &field.field_type {
        FieldType::Primitive(p) => parse_primitive(raw, *p),
        FieldType::Enum(e) => parse_enum(raw, e),
        FieldType::Message(d) => from_indexed(raw, d).map(Value::Message),
    }
}

/// Index-keyed JSON text for `message`.
pub fn serialize_text(message: &Message, descriptor: &MessageDescriptor) -> String {
    to_indexed(message, descriptor).to_string()
}

/// Decode index-keyed JSON text. Malformed JSON is an error; anything else is lenient.
pub fn deserialize_text(text: &str, descriptor: &MessageDescriptor) -> Result<Option<Message>, TextError> {
    let raw: Json = serde_json::from_str(text)?;
    Ok(from_indexed(&raw, descriptor))
}
