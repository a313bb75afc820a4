#![no_main]

use libfuzzer_sys::fuzz_target;

use mapquery::path::{compile, compile_filter};

fuzz_target!(|data: &[u8]| {
    // Path and filter compilation accept arbitrary text: compile may
    // reject with an error, compile_filter degrades to match-nothing,
    // and neither may panic.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = compile(text);
        let _ = compile_filter(text);
    }
});
