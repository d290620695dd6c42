//! Build pipeline.
//!
//! ```text
//! content/ ──load──▶ config + posts + photos
//!                          │
//!           passthrough ◀──┤──▶ process images ──▶ ImageSet
//!                          │                          │
//!                          └──────────▶ render ◀──────┘ ──▶ _site/**/index.html
//!                                        feed  ──▶ _site/feed.xml
//! ```
//!
//! Every stage runs on every build; only image encoding is incremental
//! (see [`cache`](crate::cache)). Any stage error aborts the build. Item
//! pages and image variants left over from deleted content are removed.

use crate::cache::{CacheManifest, CacheStats};
use crate::collection::{Collection, CollectionError};
use crate::config::{self, ConfigError, SiteConfig};
use crate::feed::{self, FeedError};
use crate::filters::{AspectClass, classify_image};
use crate::imaging::ImageBackend;
use crate::passthrough::{self, PassthroughReport};
use crate::process::{self, ProcessError};
use crate::render::{self, Page, RenderError, Renderer};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("content error: {0}")]
    Collection(#[from] CollectionError),
    #[error("image processing error: {0}")]
    Process(#[from] ProcessError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content directory not found: {}", .0.display())]
    MissingSource(PathBuf),
}

/// Configuration and both collections, as loaded from a content root.
#[derive(Debug)]
pub struct SiteContent {
    pub config: SiteConfig,
    pub posts: Collection,
    pub photos: Collection,
}

/// Load `config.toml` and parse both collections.
pub fn load_site(content_root: &Path) -> Result<SiteContent, SiteError> {
    if !content_root.is_dir() {
        return Err(SiteError::MissingSource(content_root.to_path_buf()));
    }
    let config = config::load_config(content_root)?;
    let posts = Collection::build(content_root, &config.collections.posts)?;
    let photos = Collection::build(content_root, &config.collections.photos)?;
    Ok(SiteContent {
        config,
        posts,
        photos,
    })
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content_root: PathBuf,
    pub output_root: PathBuf,
    /// `false` starts from an empty cache manifest, re-encoding every image.
    pub use_cache: bool,
}

/// Counts and paths describing a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub output_root: PathBuf,
    pub posts: usize,
    pub photos: usize,
    pub pages: usize,
    pub images: usize,
    pub variants: usize,
    pub cache: CacheStats,
    pub passthrough: PassthroughReport,
}

/// Run the whole pipeline into `options.output_root`.
pub fn build(
    backend: &impl ImageBackend,
    options: &BuildOptions,
) -> Result<BuildReport, SiteError> {
    let content = load_site(&options.content_root)?;
    build_content(backend, &content, options)
}

/// Run everything after loading. Split out so callers holding a loaded
/// [`SiteContent`] (e.g. `serve`) don't parse twice.
pub fn build_content(
    backend: &impl ImageBackend,
    content: &SiteContent,
    options: &BuildOptions,
) -> Result<BuildReport, SiteError> {
    let SiteContent {
        config,
        posts,
        photos,
    } = content;
    let output = &options.output_root;
    std::fs::create_dir_all(output)?;

    let passthrough =
        passthrough::copy_passthrough(&options.content_root, output, &config.passthrough)?;

    let image_dir = output.join(config.images.output_dir.trim_matches('/'));
    let mut cache = if options.use_cache {
        CacheManifest::load(&image_dir)
    } else {
        CacheManifest::empty()
    };
    let sources = process::collect_sources(&[posts, photos]);
    let processed = process::process_images(
        backend,
        &options.content_root,
        output,
        &sources,
        &config.images,
        &mut cache,
    )?;
    cache.save(&image_dir)?;

    let renderer = Renderer::new(config, posts, photos, &processed.images);
    let pages = renderer.render_all(&mut rand::thread_rng())?;
    pages.par_iter().try_for_each(|page| -> std::io::Result<()> {
        let path = output.join(&page.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &page.html)
    })?;
    prune_stale_pages(output, &pages)?;

    feed::write_feed(output, config, posts)?;

    tracing::info!(
        pages = pages.len(),
        images = processed.images.len(),
        output = %output.display(),
        "build finished"
    );

    Ok(BuildReport {
        output_root: output.clone(),
        posts: posts.len(),
        photos: photos.len(),
        pages: pages.len(),
        images: processed.images.len(),
        variants: processed.images.variant_count(),
        cache: processed.cache_stats,
        passthrough,
    })
}

/// Delete `<section>/<slug>/index.html` pages this build did not write,
/// then their directories if nothing else is in them.
fn prune_stale_pages(output: &Path, pages: &[Page]) -> std::io::Result<()> {
    let written: HashSet<&Path> = pages.iter().map(|p| p.path.as_path()).collect();
    let mut stale = Vec::new();
    for section in render::ITEM_SECTIONS {
        let dir = output.join(section);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).min_depth(2).max_depth(2) {
            let entry = entry?;
            if entry.file_name() != "index.html" || !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(output).unwrap_or(entry.path());
            if !written.contains(rel) {
                stale.push(entry.into_path());
            }
        }
    }

    for page in stale {
        std::fs::remove_file(&page)?;
        if let Some(dir) = page.parent() {
            std::fs::remove_dir(dir).ok();
        }
        tracing::debug!(page = %page.display(), "removed stale page");
    }
    Ok(())
}

/// One photo as seen by `check`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedPhoto {
    pub slug: String,
    pub title: String,
    pub image: Option<String>,
    pub aspect: AspectClass,
}

/// Result of validating a content root without writing output.
#[derive(Debug)]
pub struct CheckReport {
    pub posts: usize,
    pub photos: Vec<CheckedPhoto>,
    pub images: usize,
}

/// Parse content and verify everything a build would need, without
/// encoding images or writing files.
pub fn check(backend: &impl ImageBackend, content_root: &Path) -> Result<CheckReport, SiteError> {
    let SiteContent {
        posts, photos, ..
    } = load_site(content_root)?;

    render::check_unique_slugs("posts", &posts)?;
    render::check_unique_slugs("photos", &photos)?;

    let sources = process::collect_sources(&[&posts, &photos]);
    for src in &sources {
        let path = content_root.join(src);
        if !path.is_file() {
            return Err(ProcessError::SourceNotFound {
                src: src.clone(),
                path,
            }
            .into());
        }
    }

    let checked = photos
        .iter()
        .map(|photo| {
            let image = photo.image.as_deref().map(process::normalize_src);
            CheckedPhoto {
                slug: photo.slug.clone(),
                title: photo.title.clone(),
                image: image.map(str::to_string),
                aspect: image
                    .map(|src| classify_image(backend, &content_root.join(src)))
                    .unwrap_or_default(),
            }
        })
        .collect();

    Ok(CheckReport {
        posts: posts.len(),
        photos: checked,
        images: sources.len(),
    })
}
