#![no_main]

use libfuzzer_sys::fuzz_target;
use gopp::{Mode, ParseOptions, parse_bytes};

fuzz_target!(|data: &[u8]| {
    // First diagnostic stops the parse
    let _ = parse_bytes("fuzz.goppx", data, ParseOptions::default());

    // Keep going through every diagnostic, with branch checking on
    let options = ParseOptions::default()
        .with_mode(Mode::CHECK_BRANCHES)
        .with_error_handler(|_| {})
        .with_include_resolver(|_| Ok(Vec::new()));
    let _ = parse_bytes("fuzz.goppx", data, options);
});
