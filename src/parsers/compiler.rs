//! Compiler build-log parsers (gcc, javac, gbuild).

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static GCC_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<file>[^:]+):(?P<line>\d+):").expect("static regex"));

static JAVAC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+): (?P<kind>warning|error): (?P<msg>.*)$")
        .expect("static regex")
});

static GBUILD_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?P<file>[^"]+)", line (?P<line>\d+)"#).expect("static regex")
});

static GBUILD_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<query>source analysis (?:warning|error) #\d+|warning #[^:]+):")
        .expect("static regex")
});

/// Parser for gcc build logs.
///
/// A warning is recognized only after an `In function` or `In file` context
/// line. The `warning:` line and any following lines that start with a space
/// (source excerpt, caret line) form its description.
#[derive(Debug, Default, Clone, Copy)]
pub struct GccLogParser;

impl WarningParser for GccLogParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        Ok(parse_gcc_log(content, source_root))
    }

    fn format_name(&self) -> &str {
        "gcc build log"
    }
}

struct PendingGcc {
    file: PathBuf,
    line: u32,
    description: Vec<String>,
}

#[derive(Default)]
struct GccState {
    in_context: bool,
    pending: Option<PendingGcc>,
    seen: HashSet<(PathBuf, u32, Vec<String>)>,
}

fn parse_gcc_log(content: &str, root: &Path) -> ParsedWarnings {
    let mut parsed = ParsedWarnings::default();
    let mut ids = IdSequence::new("gcc");
    let mut state = GccState::default();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_end();
        if let Some(pending) = state.pending.as_mut() {
            if line.starts_with(' ') {
                pending.description.push(format!("\t{line}"));
                continue;
            }
            finish_gcc(&mut state, &mut ids, &mut parsed);
        }

        let lower = line.to_lowercase();
        if lower.contains("in function") || lower.contains("in file") {
            state.in_context = true;
        }
        if state.in_context && lower.contains("warning:") {
            match GCC_LOCATION.captures(line) {
                Some(caps) => match caps["line"].parse::<u32>() {
                    Ok(number) => {
                        state.pending = Some(PendingGcc {
                            file: paths::resolve(Path::new(caps["file"].trim()), root),
                            line: number,
                            description: vec![
                                "GCC Compiler Warning:".to_string(),
                                format!("\t{line}"),
                            ],
                        });
                    }
                    Err(_) => parsed.skip(index + 1, line, "line number out of range"),
                },
                None => parsed.skip(index + 1, line, "warning line has no '<file>:<line>:' prefix"),
            }
        }
    }
    finish_gcc(&mut state, &mut ids, &mut parsed);
    parsed
}

fn finish_gcc(state: &mut GccState, ids: &mut IdSequence, parsed: &mut ParsedWarnings) {
    let Some(pending) = state.pending.take() else {
        return;
    };
    state.in_context = false;
    let key = (pending.file.clone(), pending.line, pending.description.clone());
    if !state.seen.insert(key) {
        tracing::debug!("Duplicate gcc warning omitted at {}:{}", pending.file.display(), pending.line);
        return;
    }
    parsed.records.push(
        WarningRecord::new(ids.next_id(), pending.file, pending.line, pending.description)
            .with_priority(Priority::Low),
    );
}

/// Parser for javac build logs: `<file>:<line>: warning|error: <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavacLogParser;

impl WarningParser for JavacLogParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        let mut ids = IdSequence::new("javac");
        for line in content.lines() {
            let Some(caps) = JAVAC_LINE.captures(line.trim()) else {
                continue;
            };
            let Ok(number) = caps["line"].parse::<u32>() else {
                continue;
            };
            parsed.records.push(
                WarningRecord::new(
                    ids.next_id(),
                    paths::resolve(Path::new(&caps["file"]), source_root),
                    number,
                    vec![format!("Javac Compiler Warning: {}", caps["msg"].trim())],
                )
                .with_priority(Priority::Low)
                .with_query(&caps["kind"]),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "javac build log"
    }
}

/// Parser for Green Hills `gbuild` logs, including DoubleCheck findings.
///
/// Paragraphs are separated by blank lines. Every line that mentions
/// `source analysis warning #`, `source analysis error #` or `: warning #`
/// turns its whole paragraph into one record; the location is the first
/// `"<file>", line <n>` in that paragraph.
#[derive(Debug, Default, Clone, Copy)]
pub struct GbuildLogParser;

impl WarningParser for GbuildLogParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        let mut ids = IdSequence::new("gbuild");
        let lines: Vec<&str> = content.lines().map(str::trim_end).collect();

        for (index, line) in lines.iter().enumerate() {
            let heading = if line.contains("source analysis warning #")
                || line.contains("source analysis error #")
            {
                "Warning from DoubleCheck:"
            } else if line.contains(": warning #") {
                "Warning from gbuild:"
            } else {
                continue;
            };

            let paragraph = gbuild_paragraph(&lines, index);
            let Some((file, number)) = paragraph.iter().find_map(|l| gbuild_location(l)) else {
                parsed.skip(index + 1, *line, "paragraph has no '\"<file>\", line <n>' location");
                continue;
            };
            let query = GBUILD_QUERY
                .captures(line)
                .map(|caps| caps["query"].trim().to_string())
                .unwrap_or_default();

            let mut description = vec![heading.to_string()];
            description.extend(paragraph.iter().map(|l| (*l).to_string()));
            let file = paths::resolve(Path::new(&file), source_root);
            parsed.records.push(
                WarningRecord::new(ids.next_id(), file, number, description)
                    .with_priority(Priority::Low)
                    .with_query(query),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "gbuild build log"
    }
}

/// Non-blank lines around `index`, stopping at blank lines and at the
/// `Output from compiling` banner.
fn gbuild_paragraph<'a>(lines: &[&'a str], index: usize) -> Vec<&'a str> {
    let is_banner = |l: &str| l.to_lowercase().contains("output from compiling");
    let mut start = index;
    while start > 0 && !lines[start - 1].trim().is_empty() && !is_banner(lines[start - 1]) {
        start -= 1;
    }
    let mut end = index + 1;
    while end < lines.len() && !lines[end].trim().is_empty() {
        end += 1;
    }
    lines[start..end].to_vec()
}

fn gbuild_location(line: &str) -> Option<(String, u32)> {
    let caps = GBUILD_LOCATION.captures(line)?;
    let number = caps["line"].parse().ok()?;
    Some((caps["file"].trim().to_string(), number))
}
