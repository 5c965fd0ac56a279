#![no_main]
use libfuzzer_sys::fuzz_target;
use scrub_tools::parsers::{parse_str, SourceFormat};
use std::path::Path;

/// Fuzz the compiler log and per-tool JSON parsers.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let root = Path::new("/work");
        for format in [
            SourceFormat::GccLog,
            SourceFormat::JavacLog,
            SourceFormat::GbuildLog,
            SourceFormat::PylintJson,
            SourceFormat::CoverityJson,
            SourceFormat::KlocworkJson,
            SourceFormat::SonarQubeJson,
        ] {
            let _ = parse_str(s, format, root);
        }
    }
});
