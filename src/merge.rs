//! Additive deep merge.
//!
//! A field absent in the source never erases the output's value, at any depth. Lists are
//! overwritten position by position and extended, never shortened; an absent element in
//! the source list keeps the output's element at that position.

use crate::assemble::{assemble, LeafOps};
use crate::descriptor::{EnumDescriptor, MessageDescriptor, PrimitiveType};
use crate::value::{Message, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOps;

impl LeafOps<Value> for MergeOps {
    fn primitive(&self, source: Option<&Value>, _primitive: PrimitiveType, existing: Option<Value>) -> Option<Value> {
        source.cloned().or(existing)
    }

    fn enumeration(&self, source: Option<&Value>, _descriptor: &EnumDescriptor, existing: Option<Value>) -> Option<Value> {
        source.cloned().or(existing)
    }

    fn reset_array(&self, _output: &mut Message, _name: &str) {}

    fn shrink_array(&self, _output: &mut Vec<Option<Value>>, _len: usize) {}

    fn absent_message(&self, existing: Option<Message>) -> Option<Message> {
        existing
    }
}

/// Merge `message` into a fresh instance.
pub fn merge(message: &Message, descriptor: &MessageDescriptor) -> Message {
    let mut out = descriptor.new_message();
    merge_into(message, descriptor, &mut out);
    out
}

/// Merge `message` into `output` in place.
pub fn merge_into(message: &Message, descriptor: &MessageDescriptor, output: &mut Message) {
    let taken = std::mem::take(output);
    if let Some(m) = assemble::<Value, _>(&MergeOps, Some(message), descriptor, Some(taken)) {
        *output = m;
    }
}
