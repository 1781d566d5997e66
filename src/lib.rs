//! # msgdesc: descriptor-driven message trees and codecs
//!
//! Messages are plain runtime trees ([`Message`] / [`Value`]) whose shape is given by a
//! [`MessageDescriptor`]. One descriptor drives every operation:
//!
//! - **Traversal**: [`parse`] untyped JSON into a validated message, [`copy`] and
//!   [`merge`] messages, [`equals`] for structural comparison. All of them share one
//!   generic engine ([`assemble`]) and may reuse a caller-supplied output (`*_into`).
//! - **Binary codec**: compact, index-keyed, little-endian, with per-type absence
//!   sentinels ([`codec`]).
//! - **Textual codec**: index-keyed JSON ([`text`]).
//! - **Schema DSL**: descriptors written as text and resolved by name ([`schema`]).
//!
//! ## Example DSL
//!
//! ```text
//! enum Color {
//!   RED = 10;
//!   BLUE = 1;
//! }
//!
//! message User {
//!   id: number = 1;
//!   nickname: string = 3;
//!   idHistory: repeated number = 5;
//!   color: Color = 6;
//! }
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use msgdesc::{parse, serialize_binary, deserialize_binary, Schema};
//!
//! let schema = Schema::parse("message User { id: number = 1; }").unwrap();
//! let user = schema.message("User").unwrap();
//! let msg = parse(&serde_json::json!({ "id": 12 }), &user).unwrap();
//! let bytes = serialize_binary(Some(&msg), &user).unwrap();
//! assert_eq!(deserialize_binary(Some(bytes.as_slice()), &user).unwrap(), Some(msg));
//! ```

pub mod assemble;
pub mod ast;
pub mod codec;
pub mod compare;
pub mod copy;
pub mod descriptor;
pub mod merge;
pub mod parse;
pub mod parser;
pub mod schema;
pub mod text;
pub mod value;

pub use codec::{
    deserialize_binary, serialize_binary, set_scratch_buffer_capacity, BinaryCodec, CodecError,
    DEFAULT_CAPACITY,
};
pub use compare::{equals, equals_optional};
pub use copy::{copy, copy_into};
pub use descriptor::{
    DescriptorError, EnumDescriptor, EnumValue, FieldType, MessageDescriptor, MessageField,
    PrimitiveType,
};
pub use merge::{merge, merge_into};
pub use parse::{parse, parse_into};
pub use parser::parse_schema;
pub use schema::{Schema, SchemaError};
pub use text::{deserialize_text, from_indexed, serialize_text, to_indexed, TextError};
pub use value::{Message, Value};
