//! Fuzz target for push frame decoding
//!
//! Feeds arbitrary text to `PushMessage::decode` to find:
//! - Panics on malformed JSON or unexpected field types
//! - Frames that decode but do not survive re-encoding
//!
//! Decoding should NEVER panic. Anything unrecognized must return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rollcall_proto::PushMessage;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(message) = PushMessage::decode(text) {
        let again = PushMessage::decode(&message.encode()).expect("encoded frame must decode");
        assert_eq!(again, message);
    }
});
