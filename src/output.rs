//! CLI output formatting for every command.
//!
//! Output describes content, not files: photos are listed by title with
//! their source image as an indented context line.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Built 13 pages from 3 posts and 3 photos → _site
//!     Images: 4 sources, 7 variants (2 cached, 5 encoded (7 total))
//!     Passthrough: 5 files (48.2 KB)
//!     Skipped: styles (not found)
//! ```
//!
//! ## Check
//!
//! ```text
//! Posts: 3
//! Photos
//! 001 Stairwell (portrait)
//!     Image: img/stairwell.jpg
//! 002 Notes from the road (landscape)
//! Images: 4 referenced, all present
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::site::{BuildReport, CheckReport};
use std::net::SocketAddr;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Human-readable byte count: `512 B`, `48.2 KB`, `3.1 MB`.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Built {} from {} and {} → {}",
        plural(report.pages, "page", "pages"),
        plural(report.posts, "post", "posts"),
        plural(report.photos, "photo", "photos"),
        report.output_root.display()
    )];

    if report.images > 0 {
        lines.push(format!(
            "{}Images: {}, {} ({})",
            indent(1),
            plural(report.images, "source", "sources"),
            plural(report.variants, "variant", "variants"),
            report.cache
        ));
    }

    let passthrough = &report.passthrough;
    if passthrough.copied_files > 0 {
        lines.push(format!(
            "{}Passthrough: {} ({})",
            indent(1),
            plural(passthrough.copied_files, "file", "files"),
            format_bytes(passthrough.copied_bytes)
        ));
    }
    for dir in &passthrough.missing {
        lines.push(format!("{}Skipped: {} (not found)", indent(1), dir));
    }
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Posts: {}", report.posts)];

    if report.photos.is_empty() {
        lines.push("Photos: 0".to_string());
    } else {
        lines.push("Photos".to_string());
        for (i, photo) in report.photos.iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                photo.title,
                photo.aspect
            ));
            if let Some(image) = &photo.image {
                lines.push(format!("{}Image: {}", indent(1), image));
            }
        }
    }

    lines.push(match report.images {
        0 => "Images: none referenced".to_string(),
        n => format!("Images: {n} referenced, all present"),
    });
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(root: &Path, addr: SocketAddr) -> Vec<String> {
    vec![
        format!("Serving {} at http://{}/", root.display(), addr),
        format!("{}Press Ctrl+C to stop", indent(1)),
    ]
}

pub fn print_serve_banner(root: &Path, addr: SocketAddr) {
    for line in format_serve_banner(root, addr) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
