//! Abstract syntax tree of the schema DSL, before type names are resolved.

use crate::descriptor::PrimitiveType;

/// Root of a schema file: enums and messages in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaFile {
    pub enums: Vec<EnumSection>,
    pub messages: Vec<MessageSection>,
}

#[derive(Debug, Clone)]
pub struct EnumSection {
    pub name: String,
    pub variants: Vec<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct MessageSection {
    pub name: String,
    pub fields: Vec<FieldSection>,
}

#[derive(Debug, Clone)]
pub struct FieldSection {
    pub name: String,
    pub type_ref: TypeRef,
    pub repeated: bool,
    pub index: u32,
}

/// Field type as written: a primitive keyword or the name of an enum/message.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Named(String),
}
