//! Deep copy: the output becomes field-for-field equal to the source.
//!
//! Copy is a replacement. A field absent in the source is cleared in the output, and
//! lists are truncated to the source length.

use crate::assemble::{assemble, LeafOps};
use crate::descriptor::{EnumDescriptor, MessageDescriptor, PrimitiveType};
use crate::value::{Message, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOps;

impl LeafOps<Value> for CopyOps {
    fn primitive(&self, source: Option<&Value>, _primitive: PrimitiveType, existing: Option<Value>) -> Option<Value> {
        let source = source?;
        match (source, existing) {
            (Value::String(s), Some(Value::String(mut out))) => {
                out.clone_from(s);
                Some(Value::String(out))
            }
            _ => Some(source.clone()),
        }
    }

    fn enumeration(&self, source: Option<&Value>, _descriptor: &EnumDescriptor, _existing: Option<Value>) -> Option<Value> {
        source.cloned()
    }

    fn reset_array(&self, output: &mut Message, name: &str) {
        output.remove(name);
    }

    fn shrink_array(&self, output: &mut Vec<Option<Value>>, len: usize) {
        output.truncate(len);
    }
}

/// Deep clone of `message`.
pub fn copy(message: &Message, descriptor: &MessageDescriptor) -> Message {
    let mut out = descriptor.new_message();
    copy_into(message, descriptor, &mut out);
    out
}

/// Deep overwrite of `output` with `message`, reusing `output`'s nested instances.
pub fn copy_into(message: &Message, descriptor: &MessageDescriptor, output: &mut Message) {
    let taken = std::mem::take(output);
    if let Some(m) = assemble::<Value, _>(&CopyOps, Some(message), descriptor, Some(taken)) {
        *output = m;
    }
}
