#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Summary parser must not panic on any input.
    let _ = covdiff::summary::parse(data);
});
