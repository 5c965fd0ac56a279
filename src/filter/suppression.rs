//! Inline false-positive markers and tool aliases.
//!
//! A source line suppresses a warning when it carries one of the directive
//! markers followed, anywhere later on the line, by a token naming the tool:
//!
//! ```c
//! int *p = NULL; // scrub_ignore_warning coverity
//! x = y;         /* @suppress compiler */
//! ```
//!
//! Markers and tool names are matched case-insensitively.

use std::collections::HashMap;

/// Markers that introduce a suppression directive.
pub const DIRECTIVE_MARKERS: &[&str] = &["scrub_ignore_warning", "@suppress"];

/// Built-in alias groups, keyed by the tool that emits the warnings.
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("gcc", &["compiler", "cmp"]),
    ("gbuild", &["compiler", "cmp", "dblchck", "doublecheck"]),
    ("javac", &["compiler", "cmp"]),
    ("pylint", &["compiler", "cmp"]),
    ("coverity", &["cov"]),
    ("codesonar", &["cdsnr"]),
];

/// Names a tool answers to in directives and query exclusions.
#[derive(Debug, Clone)]
pub struct ToolAliases {
    names: HashMap<String, Vec<String>>,
}

impl Default for ToolAliases {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ToolAliases {
    /// Empty table: every tool answers only to its own name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for (tool, aliases) in BUILTIN_ALIASES {
            table.add_aliases(tool, aliases);
        }
        table
    }

    /// Register extra names for `tool`.
    pub fn add_aliases(&mut self, tool: &str, aliases: &[&str]) {
        let entry = self.names.entry(tool.to_lowercase()).or_default();
        for alias in aliases {
            let alias = alias.to_lowercase();
            if !entry.contains(&alias) {
                entry.push(alias);
            }
        }
    }

    /// Whether `name` refers to `tool`, either directly or through an alias.
    #[must_use]
    pub fn matches(&self, tool: &str, name: &str) -> bool {
        let tool = tool.to_lowercase();
        let name = name.to_lowercase();
        name == tool
            || self
                .names
                .get(&tool)
                .is_some_and(|aliases| aliases.contains(&name))
    }
}

/// Lower-cased words that follow a directive marker on `line`.
///
/// Empty when the line carries no marker.
#[must_use]
pub fn directive_tokens(line: &str) -> Vec<String> {
    let lower = line.to_lowercase();
    let mut tokens = Vec::new();
    for marker in DIRECTIVE_MARKERS {
        for (start, _) in lower.match_indices(marker) {
            tokens.extend(
                lower[start + marker.len()..]
                    .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
                    .filter(|token| !token.is_empty())
                    .map(str::to_string),
            );
        }
    }
    tokens
}

/// Whether `line` carries a directive that names `tool`, one of its aliases,
/// or one of the `extra` names.
#[must_use]
pub fn suppresses(line: &str, tool: &str, aliases: &ToolAliases, extra: &[String]) -> bool {
    directive_tokens(line)
        .iter()
        .any(|token| aliases.matches(tool, token) || extra.contains(token))
}
