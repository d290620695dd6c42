//! Responsive image generation.
//!
//! Every image referenced from front matter (`image:` on posts and photos)
//! is encoded at each configured width no larger than the original, in
//! each configured format:
//!
//! ```text
//! content/img/harbour.jpg (2400×1600)
//!   └─ _site/img/generated/
//!        ├── harbour-400.avif   harbour-400.jpg
//!        ├── harbour-800.avif   harbour-800.jpg
//!        └── harbour-1600.avif  harbour-1600.jpg
//! ```
//!
//! Images are processed in two parallel passes on the ambient rayon pool:
//! every source is identified and planned first, then variants are encoded
//! or taken from the [`CacheManifest`]. Knowing every output name before
//! anything is written keeps a cached copy from reading a file another job
//! is rewriting. Workers read the manifest immutably; new entries are merged
//! after the parallel stage, and variants no longer produced are deleted.
//!
//! The result is an [`ImageSet`]: a read-only lookup from the `src` string
//! used in content to the generated variants. Rendering only ever reads it.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::collection::Collection;
use crate::config::ImagesConfig;
use crate::filters::{AspectClass, classify_dimensions};
use crate::imaging::{
    BackendError, ImageBackend, OutputFormat, PlannedVariant, VariantConfig, get_dimensions,
    plan_variants,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image `{src}` not found at {}", .path.display())]
    SourceNotFound { src: String, path: PathBuf },
    #[error("image `{src}` could not be processed: {source}")]
    Imaging {
        src: String,
        #[source]
        source: BackendError,
    },
    #[error("images `{first}` and `{second}` would both generate `{stem}-*` files")]
    NameCollision {
        stem: String,
        first: String,
        second: String,
    },
}

/// One encoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Root-relative URL, e.g. `/img/generated/harbour-800.avif`.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

/// All variants generated for one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub aspect: AspectClass,
    /// Formats in configured order. The last one is the `<img>` fallback.
    pub formats: Vec<OutputFormat>,
    /// Ordered by width, then by format.
    pub variants: Vec<Variant>,
}

impl ProcessedImage {
    pub fn variants_in(&self, format: OutputFormat) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(move |v| v.format == format)
    }

    /// `srcset` attribute value for one format: `url 400w, url 800w`.
    pub fn srcset(&self, format: OutputFormat) -> String {
        self.variants_in(format)
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn fallback_format(&self) -> Option<OutputFormat> {
        self.formats.last().copied()
    }

    /// Largest variant in the fallback format.
    pub fn fallback(&self) -> Option<&Variant> {
        let format = self.fallback_format()?;
        self.variants_in(format).max_by_key(|v| v.width)
    }
}

/// Lookup from content `src` to its processed variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSet {
    images: BTreeMap<String, ProcessedImage>,
}

impl ImageSet {
    pub fn get(&self, src: &str) -> Option<&ProcessedImage> {
        self.images.get(normalize_src(src))
    }

    pub fn insert(&mut self, image: ProcessedImage) {
        self.images.insert(image.src.clone(), image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessedImage> {
        self.images.values()
    }

    pub fn variant_count(&self) -> usize {
        self.images.values().map(|i| i.variants.len()).sum()
    }
}

/// Outcome of the process stage.
#[derive(Debug)]
pub struct ProcessResult {
    pub images: ImageSet,
    pub cache_stats: CacheStats,
}

/// Image paths are relative to the content root; a leading `/` is accepted.
pub fn normalize_src(src: &str) -> &str {
    src.trim().trim_start_matches('/')
}

/// Distinct image sources referenced by the given collections, sorted.
pub fn collect_sources(collections: &[&Collection]) -> Vec<String> {
    collections
        .iter()
        .flat_map(|c| c.iter())
        .filter_map(|item| item.image.as_deref())
        .map(normalize_src)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Generate variants for every source into `output_root/<images.output_dir>`.
///
/// `cache` is consulted during the parallel stage and updated afterwards;
/// the caller decides whether to persist it.
pub fn process_images(
    backend: &impl ImageBackend,
    content_root: &Path,
    output_root: &Path,
    sources: &[String],
    images: &ImagesConfig,
    cache: &mut CacheManifest,
) -> Result<ProcessResult, ProcessError> {
    check_stem_collisions(sources)?;

    let url_prefix = images.output_dir.trim_matches('/');
    let image_dir = output_root.join(url_prefix);
    std::fs::create_dir_all(&image_dir)?;
    let variant_config = VariantConfig::from_images_config(images);

    let job = ImageJob {
        content_root,
        image_dir: &image_dir,
        url_prefix,
        config: &variant_config,
        cache: &*cache,
    };
    let plans = sources
        .par_iter()
        .map(|src| job.plan(backend, src))
        .collect::<Result<Vec<_>, _>>()?;
    let outputs: HashSet<&str> = plans
        .iter()
        .flat_map(|plan| plan.variants.iter().map(|v| v.file_name.as_str()))
        .collect();
    let outcomes = plans
        .par_iter()
        .map(|plan| job.generate(backend, plan, &outputs))
        .collect::<Result<Vec<_>, _>>()?;

    for stale in cache.retain_outputs(&outputs) {
        match std::fs::remove_file(image_dir.join(&stale)) {
            Ok(()) => tracing::debug!(file = %stale, "removed stale variant"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    let mut set = ImageSet::default();
    let mut stats = CacheStats::default();
    for outcome in outcomes {
        for record in outcome.records {
            cache.insert(record.file_name, record.source_hash, record.params_hash);
        }
        stats = stats.merge(outcome.stats);
        set.insert(outcome.image);
    }

    Ok(ProcessResult {
        images: set,
        cache_stats: stats,
    })
}

fn file_stem(src: &str) -> String {
    Path::new(src)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| src.to_string())
}

fn check_stem_collisions(sources: &[String]) -> Result<(), ProcessError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for src in sources {
        let stem = file_stem(src);
        if let Some(first) = seen.get(&stem) {
            return Err(ProcessError::NameCollision {
                stem,
                first: first.to_string(),
                second: src.clone(),
            });
        }
        seen.insert(stem, src);
    }
    Ok(())
}

struct CacheRecord {
    file_name: String,
    source_hash: String,
    params_hash: String,
}

struct ImageOutcome {
    image: ProcessedImage,
    records: Vec<CacheRecord>,
    stats: CacheStats,
}

/// Shared, read-only inputs of one process run.
struct ImageJob<'a> {
    content_root: &'a Path,
    image_dir: &'a Path,
    url_prefix: &'a str,
    config: &'a VariantConfig,
    cache: &'a CacheManifest,
}

/// One source, identified and hashed, with its variants planned.
struct ImagePlan<'s> {
    src: &'s str,
    width: u32,
    height: u32,
    source_hash: String,
    variants: Vec<PlannedVariant>,
}

impl ImageJob<'_> {
    fn plan<'s>(
        &self,
        backend: &impl ImageBackend,
        src: &'s str,
    ) -> Result<ImagePlan<'s>, ProcessError> {
        let source = self.content_root.join(src);
        if !source.is_file() {
            return Err(ProcessError::SourceNotFound {
                src: src.to_string(),
                path: source,
            });
        }
        let (width, height) =
            get_dimensions(backend, &source).map_err(|source| ProcessError::Imaging {
                src: src.to_string(),
                source,
            })?;
        let source_hash = cache::hash_file(&source)?;
        let variants = plan_variants(
            &source,
            self.image_dir,
            &file_stem(src),
            (width, height),
            self.config,
        );
        Ok(ImagePlan {
            src,
            width,
            height,
            source_hash,
            variants,
        })
    }

    /// Encode or reuse every planned variant. `outputs` holds every file
    /// name written in this run: a cached file under one of those names may
    /// be overwritten by another job, so it is never copied from.
    fn generate(
        &self,
        backend: &impl ImageBackend,
        plan: &ImagePlan<'_>,
        outputs: &HashSet<&str>,
    ) -> Result<ImageOutcome, ProcessError> {
        let src = plan.src;
        let mut stats = CacheStats::default();
        let mut records = Vec::with_capacity(plan.variants.len());
        let mut variants = Vec::with_capacity(plan.variants.len());

        for variant in &plan.variants {
            let params = &variant.params;
            let params_hash =
                cache::hash_variant_params(params.width, params.format, params.quality.value());

            match self
                .cache
                .find_cached(&plan.source_hash, &params_hash, self.image_dir)
            {
                Some(stored) if stored == variant.file_name => stats.hit(),
                Some(stored) if !outputs.contains(stored.as_str()) => {
                    std::fs::copy(self.image_dir.join(&stored), &params.output)?;
                    stats.copy();
                }
                _ => {
                    backend
                        .resize(params)
                        .map_err(|source| ProcessError::Imaging {
                            src: src.to_string(),
                            source,
                        })?;
                    stats.miss();
                }
            }

            variants.push(Variant {
                url: if self.url_prefix.is_empty() {
                    format!("/{}", variant.file_name)
                } else {
                    format!("/{}/{}", self.url_prefix, variant.file_name)
                },
                width: params.width,
                height: params.height,
                format: params.format,
            });
            records.push(CacheRecord {
                file_name: variant.file_name.clone(),
                source_hash: plan.source_hash.clone(),
                params_hash,
            });
        }

        tracing::debug!(src, variants = variants.len(), %stats, "processed image");

        Ok(ImageOutcome {
            image: ProcessedImage {
                src: src.to_string(),
                width: plan.width,
                height: plan.height,
                aspect: classify_dimensions(plan.width, plan.height),
                formats: self.config.formats.clone(),
                variants,
            },
            records,
            stats,
        })
    }
}
