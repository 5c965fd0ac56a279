//! Query exclusion lists.

use super::suppression::ToolAliases;
use std::path::Path;

/// `(tool, query)` pairs whose warnings are always dropped.
///
/// The file format is one `tool: query` entry per line. Blank lines and
/// `#` comments are ignored; anything else without a `:` is skipped with a
/// warning. Tool names are case-insensitive, queries are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryExclusions {
    entries: Vec<(String, String)>,
}

impl QueryExclusions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse exclusion text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut exclusions = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(':') {
                Some((tool, query)) if !tool.trim().is_empty() && !query.trim().is_empty() => {
                    exclusions.insert(tool.trim(), query.trim());
                }
                _ => tracing::warn!(
                    "Ignoring malformed query exclusion on line {}: {}",
                    index + 1,
                    line
                ),
            }
        }
        exclusions
    }

    /// Read an exclusion file; a missing file means no exclusions.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No query exclusion file at {}", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn insert(&mut self, tool: &str, query: &str) {
        let entry = (tool.to_lowercase(), query.to_string());
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a warning from `tool` for `query` is excluded.
    #[must_use]
    pub fn excludes(&self, tool: &str, query: &str, aliases: &ToolAliases) -> bool {
        self.entries
            .iter()
            .any(|(t, q)| q == query && aliases.matches(tool, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        let text = "# header\n\ncoverity: NULL_RETURNS\nCOMPILER : -Wunused\nnot an entry\ngcc:\n";
        let ex = QueryExclusions::parse(text);
        assert_eq!(ex.len(), 2);
    }

    #[test]
    fn test_excludes_through_alias() {
        let ex = QueryExclusions::parse("compiler: -Wunused\ncov: LEAK\n");
        let aliases = ToolAliases::with_builtins();
        assert!(ex.excludes("gcc", "-Wunused", &aliases));
        assert!(ex.excludes("coverity", "LEAK", &aliases));
        assert!(!ex.excludes("gcc", "LEAK", &aliases));
        assert!(!ex.excludes("codesonar", "LEAK", &aliases));
    }

    #[test]
    fn test_query_keeps_inner_colons() {
        let ex = QueryExclusions::parse("semgrep: python.lang:eval\n");
        assert!(ex.excludes("semgrep", "python.lang:eval", &ToolAliases::new()));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ex = QueryExclusions::load(&dir.path().join("nope")).unwrap();
        assert!(ex.is_empty());
    }
}
