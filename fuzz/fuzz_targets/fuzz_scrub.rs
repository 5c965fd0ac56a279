#![no_main]
use libfuzzer_sys::fuzz_target;
use scrub_tools::parsers::parse_scrub_text;
use scrub_tools::reports::format_scrub_records;
use std::path::Path;

/// Fuzz the SCRUB text parser and feed whatever parses back through the writer.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let root = Path::new("/work");
    let parsed = parse_scrub_text(&text, root);

    let _ = parse_scrub_text(&format_scrub_records(&parsed.records), root);
});
