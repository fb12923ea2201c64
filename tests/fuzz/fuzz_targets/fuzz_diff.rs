#![no_main]
use libfuzzer_sys::fuzz_target;

use covdiff::diff::{compute_diff, DiffOptions};

fuzz_target!(|data: &[u8]| {
    // Split the input into two summaries; the engine must not panic on
    // anything the parser accepts, and rendering must be stable.
    let mid = data.len() / 2;
    let (Ok(base), Ok(head)) = (
        covdiff::summary::parse(&data[..mid]),
        covdiff::summary::parse(&data[mid..]),
    ) else {
        return;
    };
    let result = compute_diff(&base, &head, &DiffOptions::default());
    assert_eq!(result.markdown, result.format(&covdiff::report::MarkdownFormatter));
});
