//! Index-keyed JSON codec.

mod common;

use common::{bools, enums, nested_user, numbers, strings, user};
use msgdesc::{deserialize_text, equals, serialize_text, to_indexed, Message, TextError, Value};
use serde_json::json;

fn card(number: f64) -> Option<Value> {
    Some(Value::Message(Message::new().with("cardNumber", number)))
}

#[test]
fn test_stringify_one_layer() {
    let msg = Message::new()
        .with("id", 12.0)
        .with("isPaid", true)
        .with("nickname", "jack")
        .with("idHistory", numbers(&[Some(11.0), Some(20.0), None, Some(855.0)]))
        .with("isPaidHistory", bools(&[Some(false), Some(true), Some(false)]))
        .with("nicknameHistory", strings(&[Some("queen"), Some("king")]));
    assert_eq!(
        serialize_text(&msg, &user()),
        r#"{"1":12,"2":true,"3":"jack","5":[11,20,null,855],"6":[false,true,false],"8":["queen","king"]}"#
    );
}

#[test]
fn test_stringify_two_layers() {
    let msg = Message::new()
        .with("id", 25.0)
        .with(
            "userInfo",
            Message::new()
                .with("intro", "student")
                .with("backgroundColor", Value::Enum(10))
                .with("preferredColor", Value::Enum(1))
                .with("colorHistory", enums(&[Some(1), Some(2)])),
        )
        .with(
            "creditCards",
            Value::list([card(1010.0), Some(Value::Message(Message::new())), card(3030.0)]),
        );
    assert_eq!(
        serialize_text(&msg, &nested_user()),
        r#"{"1":25,"2":{"1":"student","2":10,"3":1,"4":[1,2]},"3":[{"1":1010},{},{"1":3030}]}"#
    );
}

#[test]
fn test_destringify_one_layer() {
    let raw = r#"{"1":12,"2":true,"4":"test@gmail.com","5":[11,20,"20",{},855],"6":[false,true,false,false],"7":1111,"8":["queen","king","ace"]}"#;
    let decoded = deserialize_text(raw, &user()).expect("json").expect("object");
    let expected = Message::new()
        .with("id", 12.0)
        .with("isPaid", true)
        .with("email", "test@gmail.com")
        .with("idHistory", numbers(&[Some(11.0), Some(20.0), None, None, Some(855.0)]))
        .with("isPaidHistory", bools(&[Some(false), Some(true), Some(false), Some(false)]))
        .with("nicknameHistory", strings(&[Some("queen"), Some("king"), Some("ace")]));
    assert_eq!(decoded, expected);
}

#[test]
fn test_destringify_two_layers() {
    let raw = r#"{"1":25,"2":{"1":"student","2":"RED","3":1,"4":[true,"BLUE","GREEN",10]},"3":[{"1":"1010"},2020,{},{"1":3030}]}"#;
    let decoded = deserialize_text(raw, &nested_user()).expect("json").expect("object");
    let expected = Message::new()
        .with("id", 25.0)
        .with(
            "userInfo",
            Message::new()
                .with("intro", "student")
                .with("backgroundColor", Value::Enum(10))
                .with("preferredColor", Value::Enum(1))
                .with("colorHistory", enums(&[None, Some(1), Some(2), Some(10)])),
        )
        .with(
            "creditCards",
            Value::list([
                Some(Value::Message(Message::new())),
                None,
                Some(Value::Message(Message::new())),
                card(3030.0),
            ]),
        );
    assert_eq!(decoded, expected);
}

#[test]
fn test_stringify_then_destringify() {
    let msg = Message::new()
        .with("id", 25.0)
        .with(
            "userInfo",
            Message::new()
                .with("intro", "student")
                .with("backgroundColor", Value::Enum(10))
                .with("preferredColor", Value::Enum(1))
                .with("colorHistory", enums(&[Some(1), Some(2)])),
        )
        .with(
            "creditCards",
            Value::list([card(1010.0), Some(Value::Message(Message::new())), card(3030.0)]),
        );
    let text = serialize_text(&msg, &nested_user());
    let decoded = deserialize_text(&text, &nested_user()).expect("json").expect("object");
    assert!(equals(&decoded, &msg, &nested_user()));
}

#[test]
fn test_non_object_text_is_absent() {
    assert_eq!(deserialize_text("[1,2]", &user()).expect("json"), None);
    assert_eq!(deserialize_text("null", &user()).expect("json"), None);
}

#[test]
fn test_malformed_text_is_error() {
    let err = deserialize_text("{\"1\":", &user()).unwrap_err();
    assert!(matches!(err, TextError::Json(_)));
}

#[test]
fn test_fractional_and_non_finite_numbers() {
    let msg = Message::new()
        .with("id", 1.5)
        .with("idHistory", numbers(&[Some(f64::INFINITY), Some(-2.0)]));
    assert_eq!(to_indexed(&msg, &user()), json!({ "1": 1.5, "5": [null, -2] }));
}

#[test]
fn test_mismatched_values_skipped() {
    let msg = Message::new()
        .with("id", "12")
        .with("nicknameHistory", Value::list([Some(Value::from(3.0)), Some(Value::from("x"))]));
    assert_eq!(serialize_text(&msg, &user()), r#"{"8":[null,"x"]}"#);
}
