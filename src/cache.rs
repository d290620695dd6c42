//! Incremental image cache.
//!
//! Encoding (AVIF in particular) dominates build time. The process stage
//! consults this manifest before every encode and skips the work when the
//! source bytes and the encoding parameters match a previous build.
//!
//! ## Cache keys
//!
//! Lookups are content-addressed by `"{source_hash}:{params_hash}"`, not by
//! output path, so renaming a source image keeps its encoded variants:
//!
//! - **`source_hash`**: SHA-256 of the source file. Content-based rather
//!   than mtime-based so it survives `git checkout`.
//! - **`params_hash`**: SHA-256 of (target width, output format, quality).
//!
//! A hit requires a matching entry **and** the previously written file still
//! on disk. A hit stored under a different path is copied to the new path.
//! Entries for files a build no longer produces are pruned along with the
//! files.
//!
//! ## Storage
//!
//! `.cache-manifest.json` inside the generated-image directory, so it
//! travels with the output tree. Unreadable or version-mismatched manifests
//! load as empty. `--no-cache` starts from [`CacheManifest::empty`].

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::Path;

const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Bump to invalidate every existing manifest when key computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// Manifest of encoded variants, keyed by path relative to the image dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{params_hash}"` → stored path. Rebuilt on load.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from `image_dir`, or an empty manifest if absent or unreadable.
    pub fn load(image_dir: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(image_dir.join(MANIFEST_FILENAME)) else {
            return Self::empty();
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable cache manifest");
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = content_index(&manifest.entries);
        manifest
    }

    pub fn save(&self, image_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(image_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(image_dir.join(MANIFEST_FILENAME), json)
    }

    /// Stored path of a previous encode with these hashes, if still on disk.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        image_dir: &Path,
    ) -> Option<String> {
        let stored = self
            .content_index
            .get(&format!("{source_hash}:{params_hash}"))?;
        image_dir.join(stored).exists().then(|| stored.clone())
    }

    /// Record an encoded variant. Drops the old entry if the same content
    /// previously lived at another path.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let key = format!("{source_hash}:{params_hash}");
        // Whatever this path held before has been overwritten.
        if let Some(prev) = self.entries.get(&output_path) {
            let prev_key = format!("{}:{}", prev.source_hash, prev.params_hash);
            if self.content_index.get(&prev_key) == Some(&output_path) {
                self.content_index.remove(&prev_key);
            }
        }
        if let Some(old) = self.content_index.get(&key)
            && *old != output_path
        {
            self.entries.remove(old.as_str());
        }
        self.content_index.insert(key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    /// Drop every entry whose file name is not in `keep`, returning the
    /// dropped names so their files can be deleted.
    pub fn retain_outputs(&mut self, keep: &HashSet<&str>) -> Vec<String> {
        let mut stale: Vec<String> = self
            .entries
            .keys()
            .filter(|name| !keep.contains(name.as_str()))
            .cloned()
            .collect();
        stale.sort();
        for name in &stale {
            self.entries.remove(name);
        }
        self.content_index.retain(|_, name| keep.contains(name.as_str()));
        stale
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn content_index(entries: &HashMap<String, CacheEntry>) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(path, e)| (format!("{}:{}", e.source_hash, e.params_hash), path.clone()))
        .collect()
}

/// SHA-256 of a file's contents as lowercase hex.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// SHA-256 of the parameters that determine one encoded variant.
pub fn hash_variant_params(width: u32, format: OutputFormat, quality: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"variant\0");
    hasher.update(width.to_le_bytes());
    hasher.update(format.extension().as_bytes());
    hasher.update(b"\0");
    hasher.update(quality.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// How each planned variant was satisfied during a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }

    /// Sum of two tallies, for merging per-image results.
    pub fn merge(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            copies: self.copies + other.copies,
            misses: self.misses + other.misses,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hits + self.copies, self.copies) {
            (0, _) => write!(f, "{} encoded", self.misses),
            (_, 0) => write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            ),
            _ => write!(
                f,
                "{} cached, {} copied, {} encoded ({} total)",
                self.hits,
                self.copies,
                self.misses,
                self.total()
            ),
        }
    }
}
