//! SCRUB text format parser.
//!
//! A SCRUB file is a sequence of blank-line separated blocks:
//!
//! ```text
//! gcc001 <Low> :/work/src/foo.c:42: -Wunused-variable
//!     Unused variable 'x'.
//!     Code flow data:
//!     'x' declared here
//!     /work/src/foo.c:40
//! ```

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{tool_from_id, CodeFlowStep, Priority, WarningRecord};
use crate::utils::paths;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Indentation of description and code-flow lines.
pub const INDENT: &str = "    ";

/// Marker that opens the code-flow section of a block.
pub const CODE_FLOW_MARKER: &str = "Code flow data:";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<id>\S+) <(?P<priority>[^>]*)> :(?P<file>.+?):(?P<line>\d+):(?: (?P<query>.*))?$")
        .expect("static regex")
});

/// Parser for `.scrub` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrubParser;

impl ScrubParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl WarningParser for ScrubParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        Ok(parse_scrub_text(content, source_root))
    }

    fn format_name(&self) -> &str {
        "SCRUB"
    }
}

/// Parse SCRUB text. Malformed blocks are reported and skipped.
#[must_use]
pub fn parse_scrub_text(input: &str, source_root: &Path) -> ParsedWarnings {
    let mut parsed = ParsedWarnings::default();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 0;

    for (index, raw) in input.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            flush_block(&mut parsed, &block, block_start, source_root);
            block.clear();
        } else {
            if block.is_empty() {
                block_start = index + 1;
            }
            block.push(line);
        }
    }
    flush_block(&mut parsed, &block, block_start, source_root);
    parsed
}

fn flush_block(parsed: &mut ParsedWarnings, block: &[&str], start: usize, root: &Path) {
    if block.is_empty() {
        return;
    }
    match parse_block(block, root) {
        Ok(record) => parsed.records.push(record),
        Err(reason) => parsed.skip(start, block[0], reason),
    }
}

fn parse_block(block: &[&str], root: &Path) -> Result<WarningRecord, String> {
    let header = block[0];
    let caps = HEADER
        .captures(header)
        .ok_or_else(|| "header does not match '<id> <<priority>> :<file>:<line>: <query>'".to_string())?;

    let id = &caps["id"];
    let tool = tool_from_id(id);
    if tool.is_empty() {
        return Err(format!("id '{id}' carries no tool name"));
    }
    let line: u32 = caps["line"]
        .parse()
        .map_err(|_| format!("line number '{}' out of range", &caps["line"]))?;

    let mut description = Vec::new();
    let mut flow_lines: Option<Vec<&str>> = None;
    for body_line in &block[1..] {
        let text = body_line
            .strip_prefix(INDENT)
            .ok_or_else(|| format!("line '{body_line}' is not indented by four spaces"))?;
        match flow_lines.as_mut() {
            Some(flow) => flow.push(text),
            None if text.trim().eq_ignore_ascii_case(CODE_FLOW_MARKER) => {
                flow_lines = Some(Vec::new());
            }
            None => description.push(text.to_string()),
        }
    }
    if description.is_empty() {
        return Err("warning has no description".to_string());
    }

    let code_flow = match flow_lines {
        Some(lines) => parse_code_flow(&lines, root)?,
        None => Vec::new(),
    };

    let query = caps.name("query").map_or("", |m| m.as_str().trim_end());
    Ok(
        WarningRecord::new(id, paths::resolve(Path::new(&caps["file"]), root), line, description)
            .with_tool(tool)
            .with_priority(Priority::from_label(&caps["priority"]))
            .with_query(query)
            .with_code_flow(code_flow),
    )
}

fn parse_code_flow(lines: &[&str], root: &Path) -> Result<Vec<CodeFlowStep>, String> {
    if lines.len() % 2 != 0 {
        return Err("code flow data has an unpaired line".to_string());
    }
    lines
        .chunks(2)
        .map(|pair| {
            let (file, line) = split_location(pair[1])
                .ok_or_else(|| format!("code flow location '{}' is not '<file>:<line>'", pair[1]))?;
            Ok(CodeFlowStep::new(
                paths::resolve(Path::new(file), root),
                line,
                pair[0],
            ))
        })
        .collect()
}

/// Split `<file>:<line>` at the last colon.
fn split_location(text: &str) -> Option<(&str, u32)> {
    let (file, line) = text.trim().rsplit_once(':')?;
    if file.is_empty() {
        return None;
    }
    Some((file, line.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ROOT: &str = "/work";

    #[test]
    fn test_parse_basic_block() {
        let input = "gcc001 <Low> :src/foo.c:42: -Wunused-variable\n    Unused variable 'x'.\n\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        assert!(parsed.issues.is_empty());
        let w = &parsed.records[0];
        assert_eq!(w.id, "gcc001");
        assert_eq!(w.tool, "gcc");
        assert_eq!(w.priority, Priority::Low);
        assert_eq!(w.query.as_deref(), Some("-Wunused-variable"));
        assert_eq!(w.line, 42);
        assert_eq!(w.file, PathBuf::from("/work/src/foo.c"));
        assert_eq!(w.description, vec!["Unused variable 'x'."]);
    }

    #[test]
    fn test_empty_query_and_unknown_priority() {
        let input = "cov010 <Critical> :/abs/a.c:3: \n    text\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        let w = &parsed.records[0];
        assert_eq!(w.query, None);
        assert_eq!(w.priority, Priority::Low);
        assert_eq!(w.file, PathBuf::from("/abs/a.c"));
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let input = "not a header\n    desc\n\ngcc002 <Med> :a.c:1: q\n    ok\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].id, "gcc002");
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].line, 1);
    }

    #[test]
    fn test_missing_description_is_issue() {
        let parsed = parse_scrub_text("gcc001 <Low> :a.c:1: q\n", Path::new(ROOT));
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.issues.len(), 1);
    }

    #[test]
    fn test_bad_indent_is_issue() {
        let parsed = parse_scrub_text("gcc001 <Low> :a.c:1: q\n  two spaces\n", Path::new(ROOT));
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_code_flow_pairs() {
        let input = "codesonar001 <High> :src/a.c:20: NULL_DEREF\n    Null pointer dereference\n    code flow data:\n    p set to NULL\n    src/a.c:12\n    p dereferenced\n    /work/src/a.c:20\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        let w = &parsed.records[0];
        assert_eq!(w.description, vec!["Null pointer dereference"]);
        assert_eq!(w.code_flow.len(), 2);
        assert_eq!(w.code_flow[0], CodeFlowStep::new("/work/src/a.c", 12, "p set to NULL"));
        assert_eq!(w.code_flow[1].line, 20);
    }

    #[test]
    fn test_unpaired_code_flow_fails_block() {
        let input = "x001 <Low> :a.c:1: q\n    d\n    Code flow data:\n    lonely\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.issues.len(), 1);
    }

    #[test]
    fn test_crlf_input() {
        let input = "gcc001 <Low> :a.c:1: q\r\n    d\r\n\r\ngcc002 <Low> :a.c:2: q\r\n    e\r\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].description, vec!["e"]);
    }

    #[test]
    fn test_description_keeps_extra_indent() {
        let input = "gcc001 <Low> :a.c:1: \n    GCC Compiler Warning:\n    \ta.c:1: warning: x\n";
        let parsed = parse_scrub_text(input, Path::new(ROOT));
        assert_eq!(parsed.records[0].description[1], "\ta.c:1: warning: x");
    }
}
