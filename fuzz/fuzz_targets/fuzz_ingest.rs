//! Fuzz target: `ingest::process_message`
//!
//! Arbitrary message bodies must never panic the consumer-side decoder.
//!
//! cargo fuzz run fuzz_ingest

#![no_main]

use libfuzzer_sys::fuzz_target;
use tctracker::ingest;

fuzz_target!(|data: &[u8]| {
    if let Ok(rec) = ingest::process_message(data) {
        assert!(rec.latitude.abs() <= 90.0);
        assert!(rec.longitude.abs() <= 180.0);
    }
});
