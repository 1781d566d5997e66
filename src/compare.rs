//! Structural equality of message trees under a descriptor.
//!
//! Fields not declared by the descriptor are ignored. Both-absent is equal, one-absent is
//! not. Lists compare by length and position, including absent elements.

use crate::descriptor::{FieldType, MessageDescriptor, MessageField};
use crate::value::{Message, Value};

/// Equality of two present messages.
pub fn equals(left: &Message, right: &Message, descriptor: &MessageDescriptor) -> bool {
    equal_message(left, right, descriptor)
}

/// Equality where either side may be absent.
pub fn equals_optional(left: Option<&Message>, right: Option<&Message>, descriptor: &MessageDescriptor) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => equal_message(l, r, descriptor),
        _ => false,
    }
}

fn equal_message(left: &Message, right: &Message, descriptor: &MessageDescriptor) -> bool {
    for field in descriptor.fields() {
        let (l, r) = match (left.get(&field.name), right.get(&field.name)) {
            (None, None) => continue,
            (Some(l), Some(r)) => (l, r),
            _ => return false,
        };
        let equal = if field.repeated {
            match (l.as_list(), r.as_list()) {
                (Some(a), Some(b)) => {
                    a.len() == b.len()
                        && a.iter()
                            .zip(b)
                            .all(|(x, y)| equal_element(x.as_ref(), y.as_ref(), field))
                }
                _ => false,
            }
        } else {
            equal_value(l, r, field)
        };
        if !equal {
            return false;
        }
    }
    true
}

fn equal_element(left: Option<&Value>, right: Option<&Value>, field: &MessageField) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => equal_value(l, r, field),
        _ => false,
    }
}

fn equal_value(left: &Value, right: &Value, field: &MessageField) -> bool {
    match &field.field_type {
        FieldType::Message(d) => match (left.as_message(), right.as_message()) {
            (Some(l), Some(r)) => equal_message(l, r, d),
            _ => false,
        },
        // NaN never equals NaN here, same as any other float comparison.
        _ => left == right,
    }
}
