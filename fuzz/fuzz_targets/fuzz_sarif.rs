#![no_main]
use libfuzzer_sys::fuzz_target;
use scrub_tools::parsers::{SarifParser, WarningParser};
use std::path::Path;

/// Fuzz the SARIF parser.
///
/// Wraps input in a run envelope to reach result handling rather than
/// failing at the top-level structure.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = SarifParser::new();
        let root = Path::new("/work");

        // Try raw input
        let _ = parser.parse_str(s, root);

        // Try wrapping in a SARIF 2.1.0 envelope
        if s.len() < 10_000 {
            let wrapped = format!(
                r#"{{"version":"2.1.0","runs":[{{"tool":{{"driver":{{"name":"fuzz"}}}},"results":[{s}]}}]}}"#,
            );
            let _ = parser.parse_str(&wrapped, root);
        }
    }
});
