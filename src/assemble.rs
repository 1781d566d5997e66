//! Schema-driven traversal engine shared by parse, copy and merge.
//!
//! One recursive walk ([`assemble`]) follows a [`MessageDescriptor`] over a source tree and
//! writes into an output [`Message`]. What happens at the leaves is decided by a [`LeafOps`]
//! strategy:
//!
//! | Operation | Absent leaf | Absent list | List longer in output |
//! |-----------|-------------|-------------|-----------------------|
//! | [parse](crate::parse) | absent | cleared | truncated |
//! | [copy](crate::copy) | absent | cleared | truncated |
//! | [merge](crate::merge) | existing kept | kept | kept |
//!
//! ## Output reuse
//!
//! When an output is supplied it is moved in and the same instance is moved back out, so
//! nested messages and list buffers of the output are mutated in place instead of being
//! reallocated. Elements at position `i` of a repeated field are assembled against the
//! output's element at `i`, which lets nested messages inside lists be reused as well.
//!
//! ## Source trees
//!
//! The engine reads sources through [`Tree`], implemented for loosely-typed JSON
//! ([`serde_json::Value`], used by parse) and for the runtime [`Value`] (used by copy and merge).

use crate::descriptor::{EnumDescriptor, FieldType, MessageDescriptor, MessageField, PrimitiveType};
use crate::value::{Message, Value};
use serde_json::{Map as JsonMap, Value as Json};

/// Read-only view of a source tree.
pub trait Tree: Sized {
    /// Node holding named fields.
    type Object;
    /// Item stored in a list.
    type Element;

    fn as_object(&self) -> Option<&Self::Object>;

    /// Field lookup; missing and null both read as `None`.
    fn field<'a>(object: &'a Self::Object, name: &str) -> Option<&'a Self>;

    fn as_array(&self) -> Option<&[Self::Element]>;

    /// A list element, `None` when the element is absent.
    fn element(element: &Self::Element) -> Option<&Self>;
}

impl Tree for Value {
    type Object = Message;
    type Element = Option<Value>;

    fn as_object(&self) -> Option<&Message> {
        self.as_message()
    }

    fn field<'a>(object: &'a Message, name: &str) -> Option<&'a Value> {
        object.get(name)
    }

    fn as_array(&self) -> Option<&[Option<Value>]> {
        self.as_list()
    }

    fn element(element: &Option<Value>) -> Option<&Value> {
        element.as_ref()
    }
}

impl Tree for Json {
    type Object = JsonMap<String, Json>;
    type Element = Json;

    fn as_object(&self) -> Option<&JsonMap<String, Json>> {
        Json::as_object(self)
    }

    fn field<'a>(object: &'a JsonMap<String, Json>, name: &str) -> Option<&'a Json> {
        object.get(name).filter(|v| !v.is_null())
    }

    fn as_array(&self) -> Option<&[Json]> {
        Json::as_array(self).map(Vec::as_slice)
    }

    fn element(element: &Json) -> Option<&Json> {
        if element.is_null() {
            None
        } else {
            Some(element)
        }
    }
}

/// Leaf behavior plugged into [`assemble`].
pub trait LeafOps<T: Tree> {
    /// New value of a primitive leaf from its source and the output's current value.
    fn primitive(&self, source: Option<&T>, primitive: PrimitiveType, existing: Option<Value>) -> Option<Value>;

    /// New value of an enum leaf.
    fn enumeration(&self, source: Option<&T>, descriptor: &EnumDescriptor, existing: Option<Value>) -> Option<Value>;

    /// Source list of a repeated field, or `None` when the source has no list there.
    fn source_array<'a>(&self, source: Option<&'a T>) -> Option<&'a [T::Element]> {
        source.and_then(T::as_array)
    }

    /// Called when the source has no list for a repeated field.
    fn reset_array(&self, output: &mut Message, name: &str);

    /// Called after the source list has been applied; `len` is the source length.
    fn shrink_array(&self, output: &mut Vec<Option<Value>>, len: usize);

    /// Result of a nested message whose source is absent.
    fn absent_message(&self, _existing: Option<Message>) -> Option<Message> {
        None
    }
}

/// Walk `descriptor` over `source`, writing into `output` (or a fresh instance).
///
/// Returns `None` when the source is absent and the strategy does not keep the output.
pub fn assemble<T, L>(
    ops: &L,
    source: Option<&T::Object>,
    descriptor: &MessageDescriptor,
    output: Option<Message>,
) -> Option<Message>
where
    T: Tree,
    L: LeafOps<T> + ?Sized,
{
    let source = match source {
        Some(s) => s,
        None => return ops.absent_message(output),
    };
    let mut result = output.unwrap_or_else(|| descriptor.new_message());
    for field in descriptor.fields() {
        let source_field = T::field(source, &field.name);
        if !field.repeated {
            result.update(&field.name, |existing| {
                assemble_field(ops, source_field, field, existing)
            });
            continue;
        }
        let elements = match ops.source_array(source_field) {
            Some(e) => e,
            None => {
                ops.reset_array(&mut result, &field.name);
                continue;
            }
        };
        if !matches!(result.get(&field.name), Some(Value::List(_))) {
            result.insert(&field.name, Value::List(Vec::with_capacity(elements.len())));
        }
        let list = match result.get_mut(&field.name).and_then(Value::as_list_mut) {
            Some(l) => l,
            None => continue,
        };
        for (i, element) in elements.iter().enumerate() {
            let element = T::element(element);
            if i < list.len() {
                let existing = list[i].take();
                list[i] = assemble_field(ops, element, field, existing);
            } else {
                list.push(assemble_field(ops, element, field, None));
            }
        }
        ops.shrink_array(list, elements.len());
    }
    Some(result)
}

fn assemble_field<T, L>(
    ops: &L,
    source: Option<&T>,
    field: &MessageField,
    existing: Option<Value>,
) -> Option<Value>
where
    T: Tree,
    L: LeafOps<T> + ?Sized,
{
    match &field.field_type {
        FieldType::Primitive(p) => ops.primitive(source, *p, existing),
        FieldType::Enum(e) => ops.enumeration(source, e, existing),
        FieldType::Message(d) => {
            let existing = match existing {
                Some(Value::Message(m)) => Some(m),
                _ => None,
            };
            assemble::<T, L>(ops, source.and_then(T::as_object), d, existing).map(Value::Message)
        }
    }
}
