//! Binary decode fuzz target: arbitrary bytes against a nested descriptor.
//! Decoding must return Ok or Err, never panic or over-read.
//! Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
const SCHEMA: &str = "enum Color { RED = 10; BLUE = 1; }\n\
    message Card { number: number = 1; tags: repeated string = 2; }\n\
    message User { id: number = 1; paid: bool = 2; color: Color = 3; cards: repeated Card = 4; }";

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let schema = match msgdesc::Schema::parse(SCHEMA) {
        Ok(s) => s,
        Err(_) => return,
    };
    let user = match schema.message("User") {
        Some(d) => d,
        None => return,
    };
    if let Ok(Some(message)) = msgdesc::deserialize_binary(Some(data), &user) {
        // Whatever decodes must re-encode.
        assert!(msgdesc::serialize_binary(Some(&message), &user).is_ok());
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
