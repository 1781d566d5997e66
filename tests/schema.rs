//! Schema DSL: parsing, name resolution and error reporting.

mod common;

use msgdesc::{parse_schema, DescriptorError, FieldType, PrimitiveType, Schema, SchemaError};
use msgdesc::ast::TypeRef;
use std::io::Write;

#[test]
fn test_parse_user_schema_ast() {
    let file = parse_schema(common::USER_SCHEMA).expect("parse");
    assert_eq!(file.enums.len(), 1);
    assert_eq!(file.enums[0].variants, vec![("RED".to_string(), 10), ("BLUE".to_string(), 1), ("GREEN".to_string(), 2)]);
    assert_eq!(file.messages.len(), 4);
    let user = &file.messages[0];
    assert_eq!(user.name, "User");
    assert_eq!(user.fields.len(), 7);
    let history = &user.fields[4];
    assert_eq!(history.name, "idHistory");
    assert!(history.repeated);
    assert_eq!(history.index, 5);
    assert_eq!(history.type_ref, TypeRef::Primitive(PrimitiveType::Number));
    assert_eq!(file.messages[3].fields[1].type_ref, TypeRef::Named("UserInfo".to_string()));
}

#[test]
fn test_resolve_user_schema() {
    let schema = common::schema();
    assert_eq!(
        schema.message_names().collect::<Vec<_>>(),
        vec!["User", "UserInfo", "CreditCard", "NestedUser"]
    );
    let color = schema.enumeration("Color").expect("Color");
    assert_eq!(color.value_of("RED"), Some(10));

    let nested = schema.message("NestedUser").expect("NestedUser");
    let cards = nested.field("creditCards").expect("creditCards");
    assert!(cards.repeated);
    match &cards.field_type {
        FieldType::Message(d) => assert_eq!(d.name(), "CreditCard"),
        other => panic!("unexpected type {:?}", other),
    }
    assert_eq!(nested.field_by_index(2).map(|f| f.name.as_str()), Some("userInfo"));
}

#[test]
fn test_shared_nested_descriptor() {
    let schema = Schema::parse(
        "message Point { x: number = 1; y: number = 2; }\n\
         message Line { from: Point = 1; to: Point = 2; }",
    )
    .expect("schema");
    let line = schema.message("Line").expect("Line");
    let (a, b) = match (&line.fields()[0].field_type, &line.fields()[1].field_type) {
        (FieldType::Message(a), FieldType::Message(b)) => (a.clone(), b.clone()),
        _ => panic!("expected message fields"),
    };
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn test_comments_and_bool_alias() {
    let schema = Schema::parse(
        "// flags\nmessage Flags {\n  /* both spellings */\n  a: bool = 1;\n  b: boolean = 2;\n}\n",
    )
    .expect("schema");
    let flags = schema.message("Flags").expect("Flags");
    for f in flags.fields() {
        assert!(matches!(f.field_type, FieldType::Primitive(PrimitiveType::Boolean)));
    }
}

#[test]
fn test_type_named_like_keyword_prefix() {
    // "numbers" is an identifier, not the "number" keyword.
    let schema = Schema::parse("enum numbers { ONE = 1; } message M { n: numbers = 1; }").expect("schema");
    let m = schema.message("M").expect("M");
    assert!(matches!(m.fields()[0].field_type, FieldType::Enum(_)));
}

#[test]
fn test_syntax_error() {
    let err = Schema::parse("message M { id: number }").unwrap_err();
    assert!(matches!(err, SchemaError::Syntax(_)));
}

#[test]
fn test_index_overflow_is_syntax_error() {
    let err = Schema::parse("message M { id: number = 4294967296; }").unwrap_err();
    assert!(matches!(err, SchemaError::Syntax(_)));
}

#[test]
fn test_unknown_type() {
    let err = Schema::parse("message M { c: Colour = 1; }").unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownType {
            message: "M".into(),
            field: "c".into(),
            type_name: "Colour".into(),
        }
    );
}

#[test]
fn test_duplicate_message() {
    let err = Schema::parse("message M { a: number = 1; } message M { b: number = 1; }").unwrap_err();
    assert_eq!(err, SchemaError::DuplicateType("M".into()));
}

#[test]
fn test_cycle_rejected() {
    let err = Schema::parse(
        "message A { b: B = 1; }\nmessage B { c: C = 1; }\nmessage C { a: repeated A = 1; }",
    )
    .unwrap_err();
    assert_eq!(err, SchemaError::Cycle(vec!["A".into(), "B".into(), "C".into(), "A".into()]));
    assert_eq!(err.to_string(), "message reference cycle: A -> B -> C -> A");
}

#[test]
fn test_descriptor_errors_surface() {
    let err = Schema::parse("message M { a: number = 2; b: number = 2; }").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Descriptor(DescriptorError::IndexNotAscending { index: 2, previous: 2, .. })
    ));

    let err = Schema::parse("message M { a: number = 0; }").unwrap_err();
    assert!(matches!(err, SchemaError::Descriptor(DescriptorError::ZeroIndex { .. })));

    let err = Schema::parse("enum E { NONE = 0; }").unwrap_err();
    assert!(matches!(err, SchemaError::Descriptor(DescriptorError::ReservedEnumValue { .. })));
}

#[test]
fn test_schema_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(common::USER_SCHEMA.as_bytes()).expect("write");
    let source = std::fs::read_to_string(file.path()).expect("read");
    let schema = Schema::parse(&source).expect("schema");
    assert!(schema.message("User").is_some());
    assert!(schema.message("Missing").is_none());
}
