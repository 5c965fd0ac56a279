//! Lexical path helpers.
//!
//! Nothing here reads the filesystem; paths are normalized purely by their
//! components so results are stable for files that do not exist. Relative
//! roots are anchored at the current directory.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without resolving symlinks.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                );
                if at_root {
                    if !out.has_root() {
                        out.push("..");
                    }
                } else if out.ends_with("..") {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Anchor a relative `path` at the current directory, then normalize.
///
/// When the current directory cannot be determined the path stays relative.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::path::absolute(path) {
        Ok(abs) => normalize(&abs),
        Err(e) => {
            tracing::warn!("Cannot make {} absolute: {}", path.display(), e);
            normalize(path)
        }
    }
}

/// Make `path` absolute against `root` when it is relative, then normalize.
///
/// A relative `root` is itself anchored at the current directory.
#[must_use]
pub fn resolve(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        absolute(&root.join(path))
    }
}

/// Drop a leading `file://` scheme from a uri.
#[must_use]
pub fn strip_file_scheme(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

/// Whether `root` is a proper ancestor of `path`.
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}

/// Express `path` relative to `root`, leaving it unchanged when it is outside.
#[must_use]
pub fn relativize(path: &Path, root: &Path) -> PathBuf {
    if path.is_relative() {
        return path.to_path_buf();
    }
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

/// Render a path with forward slashes, as used in SCRUB headers and SARIF uris.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
