//! Resolved schema: descriptors by name, built from the DSL.
//!
//! Type names in fields may refer to enums or messages declared anywhere in the file.
//! Nested descriptors are shared through `Arc`, so messages are built in dependency order
//! and reference cycles are rejected.

use crate::ast::{SchemaFile, TypeRef};
use crate::descriptor::{DescriptorError, EnumDescriptor, FieldType, MessageDescriptor, MessageField};
use crate::parser::parse_schema;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("syntax: {0}")]
    Syntax(String),
    #[error("duplicate type name: {0}")]
    DuplicateType(String),
    #[error("message {message}: field {field} has unknown type {type_name}")]
    UnknownType {
        message: String,
        field: String,
        type_name: String,
    },
    #[error("message reference cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Enum and message descriptors by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    enums: HashMap<String, Arc<EnumDescriptor>>,
    messages: HashMap<String, Arc<MessageDescriptor>>,
    message_order: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

impl Schema {
    /// Parse and resolve schema source.
    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        Self::resolve(parse_schema(source)?)
    }

    pub fn resolve(file: SchemaFile) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for e in &file.enums {
            if schema.enums.contains_key(&e.name) {
                return Err(SchemaError::DuplicateType(e.name.clone()));
            }
            let descriptor = EnumDescriptor::new(e.name.clone(), e.variants.iter().cloned())?;
            schema.enums.insert(e.name.clone(), Arc::new(descriptor));
        }
        let mut sections = HashMap::new();
        for (i, m) in file.messages.iter().enumerate() {
            if schema.enums.contains_key(&m.name) || sections.insert(m.name.as_str(), i).is_some() {
                return Err(SchemaError::DuplicateType(m.name.clone()));
            }
            schema.message_order.push(m.name.clone());
        }
        let mut visits = HashMap::new();
        for m in &file.messages {
            let mut path = Vec::new();
            schema.build_message(&file, &sections, &mut visits, &mut path, &m.name)?;
        }
        tracing::debug!(
            enums = schema.enums.len(),
            messages = schema.messages.len(),
            "schema resolved"
        );
        Ok(schema)
    }

    fn build_message(
        &mut self,
        file: &SchemaFile,
        sections: &HashMap<&str, usize>,
        visits: &mut HashMap<String, Visit>,
        path: &mut Vec<String>,
        name: &str,
    ) -> Result<Arc<MessageDescriptor>, SchemaError> {
        match visits.get(name) {
            Some(Visit::Done) => {
                if let Some(d) = self.messages.get(name) {
                    return Ok(d.clone());
                }
            }
            Some(Visit::InProgress) => {
                let start = path.iter().position(|p| p == name).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(name.to_string());
                return Err(SchemaError::Cycle(cycle));
            }
            None => {}
        }
        visits.insert(name.to_string(), Visit::InProgress);
        path.push(name.to_string());

        let section = &file.messages[sections[name]];
        let mut fields = Vec::with_capacity(section.fields.len());
        for f in &section.fields {
            let field_type = match &f.type_ref {
                TypeRef::Primitive(p) => FieldType::Primitive(*p),
                TypeRef::Named(type_name) => {
                    if let Some(e) = self.enums.get(type_name) {
                        FieldType::Enum(e.clone())
                    } else if sections.contains_key(type_name.as_str()) {
                        FieldType::Message(self.build_message(file, sections, visits, path, type_name)?)
                    } else {
                        return Err(SchemaError::UnknownType {
                            message: section.name.clone(),
                            field: f.name.clone(),
                            type_name: type_name.clone(),
                        });
                    }
                }
            };
            let mut field = MessageField::new(f.name.clone(), f.index, field_type);
            field.repeated = f.repeated;
            fields.push(field);
        }
        let descriptor = Arc::new(MessageDescriptor::new(section.name.clone(), fields)?);

        path.pop();
        visits.insert(name.to_string(), Visit::Done);
        self.messages.insert(name.to_string(), descriptor.clone());
        Ok(descriptor)
    }

    pub fn message(&self, name: &str) -> Option<Arc<MessageDescriptor>> {
        self.messages.get(name).cloned()
    }

    pub fn enumeration(&self, name: &str) -> Option<Arc<EnumDescriptor>> {
        self.enums.get(name).cloned()
    }

    /// Message names in declaration order.
    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.message_order.iter().map(String::as_str)
    }
}
