//! Cached, thread-safe access to source file lines.

use super::paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Number of lines in a context window.
pub const CONTEXT_WINDOW: usize = 3;

type Lines = Arc<Vec<String>>;

/// Read-only view over one source tree.
///
/// Files are read once, decoded with invalid UTF-8 replaced, and shared
/// between threads. A file that cannot be read is remembered as missing so
/// the failure is logged only once.
pub struct SourceTree {
    root: PathBuf,
    cache: RwLock<HashMap<PathBuf, Option<Lines>>>,
}

impl SourceTree {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: paths::absolute(&root.into()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All lines of `file` (relative paths resolve against the root).
    pub fn lines(&self, file: &Path) -> Option<Lines> {
        let path = paths::resolve(file, &self.root);
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = cache.get(&path) {
                return entry.clone();
            }
        }

        let loaded = match std::fs::read(&path) {
            Ok(bytes) => Some(Arc::new(split_lines(&String::from_utf8_lossy(&bytes)))),
            Err(e) => {
                tracing::warn!("Unable to read source file {}: {}", path.display(), e);
                None
            }
        };

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(path).or_insert(loaded).clone()
    }

    /// Text of a 1-based line, or `None` when the file or line does not exist.
    pub fn line(&self, file: &Path, line: u32) -> Option<String> {
        let lines = self.lines(file)?;
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        lines.get(index).cloned()
    }

    /// The three lines around `line`, clamped at the file boundaries.
    ///
    /// Line 0 is treated as line 1. Files shorter than the window yield all
    /// their lines. Returns `None` for unreadable files, empty files and
    /// lines past the end.
    pub fn context_window(&self, file: &Path, line: u32) -> Option<Vec<String>> {
        let lines = self.lines(file)?;
        window_of(&lines, line)
    }
}

fn window_of(lines: &[String], line: u32) -> Option<Vec<String>> {
    let count = lines.len();
    let line = usize::try_from(line.max(1)).ok()?;
    if count == 0 || line > count {
        return None;
    }
    if count < CONTEXT_WINDOW {
        return Some(lines.to_vec());
    }
    let center = line.clamp(2, count - 1);
    Some(lines[center - 2..=center].to_vec())
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn numbered(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("l{i}")).collect()
    }

    #[test]
    fn test_window_middle_and_edges() {
        let lines = numbered(10);
        assert_eq!(window_of(&lines, 5).unwrap(), vec!["l4", "l5", "l6"]);
        assert_eq!(window_of(&lines, 1).unwrap(), vec!["l1", "l2", "l3"]);
        assert_eq!(window_of(&lines, 0).unwrap(), vec!["l1", "l2", "l3"]);
        assert_eq!(window_of(&lines, 10).unwrap(), vec!["l8", "l9", "l10"]);
        assert!(window_of(&lines, 11).is_none());
    }

    #[test]
    fn test_window_short_file() {
        let lines = numbered(2);
        assert_eq!(window_of(&lines, 2).unwrap(), vec!["l1", "l2"]);
        assert!(window_of(&[], 1).is_none());
    }

    #[test]
    fn test_reads_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("bad.c"), b"ok\n\xff\xfe // x\r\nend\n").unwrap();
        let tree = SourceTree::new(tmp.path());
        let line = tree.line(Path::new("bad.c"), 2).unwrap();
        assert!(line.ends_with("// x"));
        assert_eq!(tree.line(Path::new("bad.c"), 3).as_deref(), Some("end"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let tree = SourceTree::new(tmp.path());
        assert!(tree.line(Path::new("nope.c"), 1).is_none());
        assert!(tree.context_window(Path::new("nope.c"), 1).is_none());
    }
}
