//! Shared test utilities for the folio test suite.
//!
//! Two ways to get a content tree:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! // The checked-in sample site, copied to a temp dir, with its images
//! let tmp = setup_fixtures();
//! let content = tmp.path().join("content");
//!
//! // Or an ad-hoc site built up file by file
//! let site = SiteBuilder::new()
//!     .post("2024-01-05-hello.md", "title: Hello\ndate: 2024-01-05", "Hi.")
//!     .photo("dawn.md", "title: Dawn\ndate: 2024-01-06\nimage: img/dawn.jpg", "")
//!     .image("img/dawn.jpg", 900, 600);
//! let backend = site.mock_backend();
//! ```

use crate::imaging::backend::tests::MockBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Images
// =========================================================================

/// Write a solid-color JPEG of the given size, creating parent directories.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 140, 160]));
    img.save(path).unwrap();
}

/// Images referenced by `fixtures/content`, with their sizes.
pub const FIXTURE_IMAGES: &[(&str, u32, u32)] = &[
    ("img/frost.jpg", 600, 400),
    ("img/harbour.jpg", 900, 600),
    ("img/ridge.jpg", 1000, 400),
    ("img/stairwell.jpg", 300, 600),
];

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to `<tmp>/content` and synthesize its images.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    let content = tmp.path().join("content");
    copy_dir_recursive(&fixtures, &content).unwrap();
    for (src, width, height) in FIXTURE_IMAGES {
        create_test_jpeg(&content.join(src), *width, *height);
    }
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Ad-hoc sites
// =========================================================================

/// A throwaway site: `<tmp>/content` as source, `<tmp>/_site` as output.
///
/// The output directory is never created here, so tests can assert that a
/// command left it untouched.
pub struct SiteBuilder {
    tmp: TempDir,
    images: Vec<(PathBuf, u32, u32)>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("content")).unwrap();
        Self {
            tmp,
            images: Vec::new(),
        }
    }

    pub fn content_root(&self) -> PathBuf {
        self.tmp.path().join("content")
    }

    pub fn output_root(&self) -> PathBuf {
        self.tmp.path().join("_site")
    }

    /// Write any file under the content root.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.content_root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    /// Write `posts/<name>` with the given front matter and body.
    pub fn post(self, name: &str, front: &str, body: &str) -> Self {
        self.file(&format!("posts/{name}"), &format!("---\n{front}\n---\n{body}\n"))
    }

    /// Write `photos/<name>` with the given front matter and body.
    pub fn photo(self, name: &str, front: &str, body: &str) -> Self {
        self.file(&format!("photos/{name}"), &format!("---\n{front}\n---\n{body}\n"))
    }

    /// Write `posts/<name>` verbatim, delimiters and all.
    pub fn raw_post(self, name: &str, contents: &str) -> Self {
        self.file(&format!("posts/{name}"), contents)
    }

    /// Write a real JPEG and remember its size for [`Self::mock_backend`].
    pub fn image(mut self, rel: &str, width: u32, height: u32) -> Self {
        let path = self.content_root().join(rel);
        create_test_jpeg(&path, width, height);
        self.images.push((path, width, height));
        self
    }

    /// A mock backend that knows the dimensions of every [`Self::image`].
    pub fn mock_backend(&self) -> MockBackend {
        let entries: Vec<(&Path, u32, u32)> = self
            .images
            .iter()
            .map(|(path, w, h)| (path.as_path(), *w, *h))
            .collect();
        MockBackend::with_dimensions(&entries)
    }
}

// =========================================================================
// Output lookups
// =========================================================================

/// Read a generated file. Panics with the directory listing on miss.
pub fn find_page(output_root: &Path, rel: &str) -> String {
    std::fs::read_to_string(output_root.join(rel)).unwrap_or_else(|_| {
        let files: Vec<String> = walkdir::WalkDir::new(output_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(output_root)
                    .unwrap_or(e.path())
                    .display()
                    .to_string()
            })
            .collect();
        panic!("{rel} not generated. Available: {files:?}")
    })
}
