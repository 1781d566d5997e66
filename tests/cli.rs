//! End-to-end runs of the msgdesc binary against a schema file on disk.

mod common;

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn schema_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(common::USER_SCHEMA.as_bytes()).expect("write schema");
    file
}

fn run(args: &[&str], schema: &NamedTempFile, message: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msgdesc"))
        .args(args)
        .arg("-s")
        .arg(schema.path())
        .args(["-n", message])
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn msgdesc")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

const USER_ID_12_HEX: &str = "01000000010000000000000000002840";

#[test]
fn test_serialize_hex() {
    let schema = schema_file();
    let out = run(&["serialize", r#"{"id":12,"bogus":1}"#], &schema, "User");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(stdout(&out), USER_ID_12_HEX);
}

#[test]
fn test_deserialize_hex() {
    let schema = schema_file();
    let out = run(&["deserialize", USER_ID_12_HEX], &schema, "User");
    assert!(out.status.success());
    assert_eq!(stdout(&out), r#"{"id":12}"#);
}

#[test]
fn test_base64_round_trip() {
    let schema = schema_file();
    let json = r#"{"id":25,"userInfo":{"intro":"student","backgroundColor":"RED"},"creditCards":[{"cardNumber":1010},null]}"#;
    let encoded = run(&["serialize", json, "-e", "base64"], &schema, "NestedUser");
    assert!(encoded.status.success());
    let encoded_text = stdout(&encoded);
    let decoded = run(&["deserialize", encoded_text.as_str(), "-e", "base64"], &schema, "NestedUser");
    assert!(decoded.status.success());
    assert_eq!(
        stdout(&decoded),
        r#"{"id":25,"userInfo":{"intro":"student","backgroundColor":10},"creditCards":[{"cardNumber":1010},null]}"#
    );
}

#[test]
fn test_stringify_and_destringify() {
    let schema = schema_file();
    let out = run(&["stringify", r#"{"nickname":"jack","id":12}"#], &schema, "User");
    assert!(out.status.success());
    assert_eq!(stdout(&out), r#"{"1":12,"3":"jack"}"#);

    let back = run(&["destringify", r#"{"3":"jack","1":12,"99":true}"#], &schema, "User");
    assert!(back.status.success());
    assert_eq!(stdout(&back), r#"{"id":12,"nickname":"jack"}"#);
}

#[test]
fn test_capacity_error_exits_nonzero() {
    let schema = schema_file();
    let out = run(&["serialize", r#"{"nickname":"jack"}"#, "--max-bytes", "8"], &schema, "User");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("capacity"), "stderr: {stderr}");
}

#[test]
fn test_unknown_message_exits_nonzero() {
    let schema = schema_file();
    let out = run(&["stringify", "{}"], &schema, "Nope");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown message Nope"));
}

#[test]
fn test_truncated_hex_exits_nonzero() {
    let schema = schema_file();
    let out = run(&["deserialize", "0100000001000000"], &schema, "User");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unexpected eof"));
}

#[test]
fn test_signed_hex_pair_rejected() {
    let schema = schema_file();
    let out = run(&["deserialize", "+f000000"], &schema, "User");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid hex \"+f\" at offset 0"));
}
