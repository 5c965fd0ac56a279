//! Regex-driven analysis file lists.
//!
//! A rules file holds one rule per line:
//!
//! ```text
//! # drop generated and third-party code, but keep one vendored header
//! - /generated/
//! - /third_party/
//! + /third_party/keep\.h$
//! ```
//!
//! Rules run in order over every candidate path. `-` removes matching paths
//! from the selection and `+` puts matching candidates back. Patterns are
//! searched (not anchored) against the candidate path as discovered, so a
//! walked tree is matched by absolute path.

use crate::utils::paths;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Include,
    Exclude,
}

#[derive(Debug, Clone)]
pub struct FileRule {
    pub action: RuleAction,
    pub pattern: Regex,
}

/// Ordered include/exclude rules.
#[derive(Debug, Clone, Default)]
pub struct FileListRules {
    rules: Vec<FileRule>,
}

impl FileListRules {
    /// Parse rules text. Invalid lines and patterns are logged and skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let action = match line.as_bytes() {
                [b'+', b' ', ..] => RuleAction::Include,
                [b'-', b' ', ..] => RuleAction::Exclude,
                _ => {
                    tracing::warn!("Invalid regex filtering line {}: {}", index + 1, line.trim());
                    continue;
                }
            };
            let pattern = line[2..].trim();
            if pattern.is_empty() {
                tracing::warn!("Invalid regex filtering line {}: {}", index + 1, line.trim());
                continue;
            }
            match Regex::new(pattern) {
                Ok(pattern) => rules.push(FileRule { action, pattern }),
                Err(e) => tracing::warn!("Invalid regex on filtering line {}: {}", index + 1, e),
            }
        }
        Self { rules }
    }

    /// Read a rules file; a missing file means no rules.
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("No filtering rules at {}; keeping every file", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRule> {
        self.rules.iter()
    }
}

/// Outcome of applying rules to a candidate list.
///
/// Both lists are root-relative, forward-slash and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl FileSelection {
    /// Excluded paths as a set usable by the filtering engine.
    #[must_use]
    pub fn exclusion_set(&self) -> HashSet<PathBuf> {
        self.excluded.iter().map(PathBuf::from).collect()
    }

    /// Write the in-scope list and, when given, the exclusion list.
    pub fn write(&self, included: &Path, excluded: Option<&Path>) -> io::Result<()> {
        write_list(included, &self.included)?;
        if let Some(path) = excluded {
            write_list(path, &self.excluded)?;
        }
        Ok(())
    }
}

/// Apply `rules` to every file under `source_root`, or to `initial` when given.
#[must_use]
pub fn build_file_list(
    source_root: &Path,
    rules: &FileListRules,
    initial: Option<Vec<PathBuf>>,
) -> FileSelection {
    let root = paths::absolute(source_root);
    let candidates = initial.unwrap_or_else(|| {
        let mut found = Vec::new();
        walk(&root, &mut found);
        found
    });
    let keys: Vec<String> = candidates.iter().map(|p| paths::to_slash(p)).collect();

    let mut selected = vec![true; candidates.len()];
    for rule in rules.iter() {
        for (index, key) in keys.iter().enumerate() {
            if rule.pattern.is_match(key) {
                selected[index] = rule.action == RuleAction::Include;
            }
        }
    }

    let mut included = BTreeSet::new();
    let mut excluded = BTreeSet::new();
    for (path, keep) in candidates.iter().zip(selected) {
        let relative = paths::to_slash(&paths::relativize(&paths::normalize(path), &root));
        if keep {
            included.insert(relative);
        } else {
            excluded.insert(relative);
        }
    }
    tracing::info!(
        "File list: {} in scope, {} excluded",
        included.len(),
        excluded.len()
    );
    FileSelection {
        included: included.into_iter().collect(),
        excluded: excluded.into_iter().collect(),
    }
}

/// Read a plain path list, one entry per line.
pub fn read_file_list(path: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Read a path list as a set of normalized relative paths.
pub fn read_file_set(path: &Path) -> io::Result<HashSet<PathBuf>> {
    Ok(read_file_list(path)?
        .iter()
        .map(|p| paths::normalize(p))
        .collect())
}

fn write_list(path: &Path, entries: &[String]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut text = entries.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    fs::write(path, text)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };
    let mut found: Vec<(PathBuf, fs::FileType)> = entries
        .flatten()
        .filter_map(|e| Some((e.path(), e.file_type().ok()?)))
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    for (path, kind) in found {
        if kind.is_dir() {
            walk(&path, out);
        } else if kind.is_symlink() && path.is_dir() {
            // Linked directories are not descended into; they may form cycles.
            tracing::debug!("Skipping symlinked directory {}", path.display());
        } else {
            out.push(path);
        }
    }
}
