//! Byte-for-byte copy of static content directories.
//!
//! Each configured directory (default `styles`, `img`) under the content
//! root lands at the same relative path in the output tree. Directories
//! that don't exist are skipped with a warning, since a fresh site may not
//! have them yet.

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// What one passthrough run copied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassthroughReport {
    pub copied_files: usize,
    pub copied_bytes: u64,
    /// Configured directories absent from the content root.
    pub missing: Vec<String>,
}

/// Copy every directory in `dirs` from `content_root` to `output_root`.
pub fn copy_passthrough(
    content_root: &Path,
    output_root: &Path,
    dirs: &[String],
) -> io::Result<PassthroughReport> {
    let mut report = PassthroughReport::default();

    for dir in dirs {
        let relative = dir.trim_matches('/');
        let source = content_root.join(relative);
        if !source.is_dir() {
            tracing::warn!(dir = %relative, "passthrough directory not found, skipping");
            report.missing.push(relative.to_string());
            continue;
        }

        for entry in WalkDir::new(&source).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let rel = entry
                .path()
                .strip_prefix(content_root)
                .unwrap_or(entry.path());
            let target = output_root.join(rel);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                report.copied_bytes += fs::copy(entry.path(), &target)?;
                report.copied_files += 1;
            }
        }
        tracing::debug!(dir = %relative, "copied passthrough directory");
    }

    Ok(report)
}
