//! Descriptor model: static, immutable description of message shapes.
//!
//! A [`MessageDescriptor`] is an ordered list of [`MessageField`]s. Each field has a
//! name (the key in a [`Message`](crate::value::Message)), a wire index (the key in the
//! binary and textual encodings) and exactly one [`FieldType`]. Nested enum and message
//! descriptors are shared through [`Arc`], so one descriptor can be referenced from many
//! fields and many threads.

use crate::value::Message;
use std::collections::HashSet;
use std::sync::Arc;

/// Errors raised while constructing descriptors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DescriptorError {
    #[error("{0}: name must not be empty")]
    EmptyName(&'static str),
    #[error("enum {enum_name}: duplicate value name {name}")]
    DuplicateEnumName { enum_name: String, name: String },
    #[error("enum {enum_name}: duplicate value {value}")]
    DuplicateEnumValue { enum_name: String, value: u32 },
    #[error("enum {enum_name}: value 0 of {name} is reserved for unknown values")]
    ReservedEnumValue { enum_name: String, name: String },
    #[error("message {message}: duplicate field name {field}")]
    DuplicateField { message: String, field: String },
    #[error("message {message}: field {field} has index 0 (indices start at 1)")]
    ZeroIndex { message: String, field: String },
    #[error("message {message}: field {field} index {index} is not greater than previous index {previous}")]
    IndexNotAscending {
        message: String,
        field: String,
        index: u32,
        previous: u32,
    },
}

/// Leaf primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Number,
    Boolean,
    String,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "bool",
            PrimitiveType::String => "string",
        }
    }
}

/// A single named enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub value: u32,
}

/// An enum: a name plus `(name, value)` pairs. Values need not be contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    values: Vec<EnumValue>,
}

impl EnumDescriptor {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Result<Self, DescriptorError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName("enum"));
        }
        let mut out: Vec<EnumValue> = Vec::new();
        for (value_name, value) in values {
            let value_name = value_name.into();
            if value == 0 {
                return Err(DescriptorError::ReservedEnumValue {
                    enum_name: name,
                    name: value_name,
                });
            }
            if out.iter().any(|v| v.name == value_name) {
                return Err(DescriptorError::DuplicateEnumName {
                    enum_name: name,
                    name: value_name,
                });
            }
            if out.iter().any(|v| v.value == value) {
                return Err(DescriptorError::DuplicateEnumValue {
                    enum_name: name,
                    value,
                });
            }
            out.push(EnumValue {
                name: value_name,
                value,
            });
        }
        Ok(EnumDescriptor { name, values: out })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Numeric value for a value name.
    pub fn value_of(&self, name: &str) -> Option<u32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// Value name for a numeric value.
    pub fn name_of(&self, value: u32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    pub fn contains(&self, value: u32) -> bool {
        self.values.iter().any(|v| v.value == value)
    }
}

/// Field type: exactly one of primitive, enum reference or nested message reference.
#[derive(Debug, Clone)]
pub enum FieldType {
    Primitive(PrimitiveType),
    Enum(Arc<EnumDescriptor>),
    Message(Arc<MessageDescriptor>),
}

/// A field of a message. A repeated field's element type is one of the three leaf kinds.
#[derive(Debug, Clone)]
pub struct MessageField {
    pub name: String,
    pub index: u32,
    pub field_type: FieldType,
    pub repeated: bool,
}

impl MessageField {
    pub fn new(name: impl Into<String>, index: u32, field_type: FieldType) -> Self {
        MessageField {
            name: name.into(),
            index,
            field_type,
            repeated: false,
        }
    }

    pub fn primitive(name: impl Into<String>, index: u32, primitive: PrimitiveType) -> Self {
        Self::new(name, index, FieldType::Primitive(primitive))
    }

    pub fn enumeration(name: impl Into<String>, index: u32, descriptor: Arc<EnumDescriptor>) -> Self {
        Self::new(name, index, FieldType::Enum(descriptor))
    }

    pub fn message(name: impl Into<String>, index: u32, descriptor: Arc<MessageDescriptor>) -> Self {
        Self::new(name, index, FieldType::Message(descriptor))
    }

    /// Mark the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// A message type: a name plus fields in declaration order, ascending by wire index.
#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    name: String,
    fields: Vec<MessageField>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<MessageField>) -> Result<Self, DescriptorError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName("message"));
        }
        let mut seen = HashSet::new();
        let mut previous: Option<u32> = None;
        for f in &fields {
            if !seen.insert(f.name.as_str()) {
                return Err(DescriptorError::DuplicateField {
                    message: name.clone(),
                    field: f.name.clone(),
                });
            }
            if f.index == 0 {
                return Err(DescriptorError::ZeroIndex {
                    message: name.clone(),
                    field: f.name.clone(),
                });
            }
            if let Some(prev) = previous {
                if f.index <= prev {
                    return Err(DescriptorError::IndexNotAscending {
                        message: name.clone(),
                        field: f.name.clone(),
                        index: f.index,
                        previous: prev,
                    });
                }
            }
            previous = Some(f.index);
        }
        Ok(MessageDescriptor { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order (ascending by index).
    pub fn fields(&self) -> &[MessageField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&MessageField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_index(&self, index: u32) -> Option<&MessageField> {
        self.fields
            .binary_search_by_key(&index, |f| f.index)
            .ok()
            .map(|i| &self.fields[i])
    }

    /// Fresh empty instance used when no output is supplied.
    pub fn new_message(&self) -> Message {
        Message::with_capacity(self.fields.len())
    }
}
