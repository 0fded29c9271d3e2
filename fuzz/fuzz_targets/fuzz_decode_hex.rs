//! Fuzz target: `codec::decode_hex`
//!
//! Arbitrary text must either decode to a record inside the valid
//! coordinate ranges or fail with `MalformedPayload`, never panic.
//!
//! cargo fuzz run fuzz_decode_hex

#![no_main]

use libfuzzer_sys::fuzz_target;
use tctracker::codec::{self, HEX_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    match codec::decode_hex(text) {
        Ok(rec) => {
            assert_eq!(text.len(), HEX_LEN);
            assert!((-90.0..=90.0).contains(&rec.latitude));
            assert!((-180.0..=180.0).contains(&rec.longitude));
            // Re-encoding the parsed bytes gives the same text back.
            let parsed = codec::parse_hex(text).unwrap();
            assert!(parsed.to_hex().eq_ignore_ascii_case(text));
        }
        Err(_) => {}
    }
});
