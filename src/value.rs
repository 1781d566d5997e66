//! Runtime message trees.
//!
//! A [`Message`] maps field names to [`Value`]s. A missing key is the one and only
//! "absent" state of a field; inside a repeated field an absent element is `None`.

use crate::descriptor::{FieldType, MessageDescriptor};
use serde_json::{Map as JsonMap, Value as Json};
use std::collections::HashMap;

/// A single present value (field or list element).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    String(String),
    /// Enum value by its underlying integer.
    Enum(u32),
    Message(Message),
    /// Repeated field; `None` marks an absent element at that position.
    List(Vec<Option<Value>>),
}

impl Value {
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        Value::List(items.into_iter().collect())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<u32> {
        match self {
            Value::Enum(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Option<Value>]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Option<Value>>> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::Bool(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::String(x.to_string())
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::String(x)
    }
}

impl From<Message> for Value {
    fn from(m: Message) -> Self {
        Value::Message(m)
    }
}

/// A message instance: field name to present value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: HashMap<String, Value>,
}

impl Message {
    pub fn new() -> Self {
        Message::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Message {
            fields: HashMap::with_capacity(n),
        }
    }

    /// Builder-style insert, handy for literals.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn insert(&mut self, name: &str, value: Value) -> Option<Value> {
        self.fields.insert(name.to_string(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Set a field to `value`, or clear it when `value` is `None`.
    pub fn set(&mut self, name: &str, value: Option<Value>) {
        match value {
            Some(v) => {
                self.insert(name, v);
            }
            None => {
                self.remove(name);
            }
        }
    }

    /// Replace a field through `f`, reusing the stored key when the field already exists.
    pub(crate) fn update<F>(&mut self, name: &str, f: F)
    where
        F: FnOnce(Option<Value>) -> Option<Value>,
    {
        match self.fields.remove_entry(name) {
            Some((key, old)) => {
                if let Some(v) = f(Some(old)) {
                    self.fields.insert(key, v);
                }
            }
            None => {
                if let Some(v) = f(None) {
                    self.fields.insert(name.to_string(), v);
                }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Name-keyed JSON, fields in descriptor order. Undeclared keys are dropped.
    pub fn to_json(&self, descriptor: &MessageDescriptor) -> Json {
        let mut out = JsonMap::new();
        for f in descriptor.fields() {
            if let Some(v) = self.fields.get(&f.name) {
                out.insert(f.name.clone(), value_to_json(v, &f.field_type));
            }
        }
        Json::Object(out)
    }
}

fn value_to_json(v: &Value, field_type: &FieldType) -> Json {
    match v {
        Value::Number(x) => json_number(*x),
        Value::Bool(b) => Json::Bool(*b),
        Value::String(s) => Json::String(s.clone()),
        Value::Enum(n) => Json::from(*n),
        Value::Message(m) => match field_type {
            FieldType::Message(d) => m.to_json(d),
            _ => Json::Null,
        },
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|e| e.as_ref().map_or(Json::Null, |e| value_to_json(e, field_type)))
                .collect(),
        ),
    }
}

/// JSON number for an `f64`: integral values print without a fraction, non-finite as null.
pub(crate) fn json_number(x: f64) -> Json {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        return Json::from(x as i64);
    }
    serde_json::Number::from_f64(x).map_or(Json::Null, Json::Number)
}
