//! Shared fixtures: the user schemas and a little-endian byte builder.
#![allow(dead_code)]

use msgdesc::{MessageDescriptor, Schema, Value};
use std::sync::Arc;

pub const USER_SCHEMA: &str = r#"
enum Color {
  RED = 10;
  BLUE = 1;
  GREEN = 2;
}

message User {
  id: number = 1;
  isPaid: bool = 2;
  nickname: string = 3;
  email: string = 4;
  idHistory: repeated number = 5;
  isPaidHistory: repeated bool = 6;
  nicknameHistory: repeated string = 8;
}

message UserInfo {
  intro: string = 1;
  backgroundColor: Color = 2;
  preferredColor: Color = 3;
  colorHistory: repeated Color = 4;
}

message CreditCard {
  cardNumber: number = 1;
}

message NestedUser {
  id: number = 1;
  userInfo: UserInfo = 2;
  creditCards: repeated CreditCard = 3;
}
"#;

pub fn schema() -> Schema {
    Schema::parse(USER_SCHEMA).expect("user schema")
}

pub fn user() -> Arc<MessageDescriptor> {
    schema().message("User").expect("User")
}

pub fn nested_user() -> Arc<MessageDescriptor> {
    schema().message("NestedUser").expect("NestedUser")
}

pub fn numbers(items: &[Option<f64>]) -> Value {
    Value::list(items.iter().map(|x| x.map(Value::Number)))
}

pub fn bools(items: &[Option<bool>]) -> Value {
    Value::list(items.iter().map(|x| x.map(Value::Bool)))
}

pub fn strings(items: &[Option<&str>]) -> Value {
    Value::list(items.iter().map(|x| x.map(Value::from)))
}

pub fn enums(items: &[Option<u32>]) -> Value {
    Value::list(items.iter().map(|x| x.map(Value::Enum)))
}

/// Little-endian byte builder for expected wire images.
#[derive(Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Bytes::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn raw(mut self, b: &[u8]) -> Self {
        self.0.extend_from_slice(b);
        self
    }

    /// Length-prefixed UTF-8 string.
    pub fn str(self, s: &str) -> Self {
        self.u32(s.len() as u32).raw(s.as_bytes())
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}
