//! SCRUB text writer.

use crate::model::WarningRecord;
use crate::parsers::{CODE_FLOW_MARKER, INDENT};
use crate::utils::paths::to_slash;
use std::fmt::Write as _;

/// Format one record as a SCRUB block, including its trailing blank line.
#[must_use]
pub fn format_scrub_text(record: &WarningRecord) -> String {
    let mut out = String::new();
    write_block(&mut out, record);
    out
}

/// Format every unsuppressed record.
///
/// Suppressed records have no SCRUB representation and are left out.
#[must_use]
pub fn format_scrub_records(records: &[WarningRecord]) -> String {
    let mut out = String::new();
    for record in records.iter().filter(|r| !r.suppressed) {
        write_block(&mut out, record);
    }
    out
}

fn write_block(out: &mut String, record: &WarningRecord) {
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{} <{}> :{}:{}: {}",
        record.id,
        record.priority,
        to_slash(&record.file),
        record.line,
        record.query_str()
    );
    // A blank indented line would read back as the block separator.
    for line in record.description.iter().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "{INDENT}{line}");
    }
    if !record.code_flow.is_empty() {
        let _ = writeln!(out, "{INDENT}{CODE_FLOW_MARKER}");
        for step in &record.code_flow {
            let _ = writeln!(out, "{INDENT}{}", step.description);
            let _ = writeln!(out, "{INDENT}{}:{}", to_slash(&step.file), step.line);
        }
    }
    out.push('\n');
}
