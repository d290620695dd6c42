//! Collections: the ordered list of content items under one directory.
//!
//! A collection is the **reverse of enumeration order** of its matching
//! files. Enumeration is a walk of the collection directory with entries
//! sorted by file name, so with date-prefixed names the newest file comes
//! first. Front-matter dates are not consulted for ordering.
//!
//! ```text
//! posts/2023-01-10-first.md    ┐                 ┌ posts/2024-02-01-third.md
//! posts/2023-06-02-second.md   ├ enumerate ─ rev ┤ posts/2023-06-02-second.md
//! posts/2024-02-01-third.md    ┘                 └ posts/2023-01-10-first.md
//! ```

use crate::config::CollectionConfig;
use crate::content::{ContentError, ContentItem};
use globset::GlobBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("invalid collection pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to walk collection directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// List files under `dir` whose path relative to `dir` matches `pattern`,
/// in enumeration order.
///
/// `*` does not cross `/`, so `*.md` only matches direct children and
/// `**/*.md` descends. A missing directory enumerates as empty.
pub fn enumerate(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, CollectionError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| CollectionError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// An ordered, immutable list of parsed content items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<ContentItem>,
}

impl Collection {
    /// Enumerate and parse the collection described by `config` under the
    /// content `root`, newest-enumerated first.
    pub fn build(root: &Path, config: &CollectionConfig) -> Result<Self, CollectionError> {
        let dir = root.join(&config.dir);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "collection directory missing, treating as empty");
        }
        let files = enumerate(&dir, &config.pattern)?;

        let mut items = files
            .par_iter()
            .map(|path| ContentItem::load(root, path))
            .collect::<Result<Vec<_>, _>>()?;
        items.reverse();

        tracing::debug!(dir = %config.dir, count = items.len(), "built collection");
        Ok(Self { items })
    }

    /// Wrap items that are already in collection order.
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First slug that appears on more than one item, if any.
    pub fn duplicate_slug(&self) -> Option<&ContentItem> {
        let mut seen = std::collections::HashSet::new();
        self.items
            .iter()
            .find(|item| !seen.insert(item.slug.as_str()))
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
