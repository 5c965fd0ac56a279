//! Output handling for pipeline stages.

use crate::error::{Result as ScrubResult, ScrubError};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Target for output - either stdout or a file
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }
}

/// Write output to the target (stdout or file), creating parent directories.
pub fn write_output(content: &str, target: &OutputTarget, quiet: bool) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            print!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                tracing::info!("Output written to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Check that an artifact is not empty.
///
/// An empty file or directory is an error when `critical`, otherwise it is
/// only logged. A missing artifact counts as empty.
pub fn check_artifact(path: &Path, critical: bool) -> ScrubResult<()> {
    let empty = if path.is_file() {
        std::fs::metadata(path)
            .map_err(|e| ScrubError::io(path, e))?
            .len()
            == 0
    } else if path.is_dir() {
        std::fs::read_dir(path)
            .map_err(|e| ScrubError::io(path, e))?
            .next()
            .is_none()
    } else {
        true
    };

    if empty {
        if critical {
            return Err(ScrubError::validation(format!(
                "{} is empty. This should not be empty.",
                path.display()
            )));
        }
        tracing::warn!("{} is empty. This may or may not be a problem.", path.display());
    }
    Ok(())
}
