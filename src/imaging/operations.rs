//! High-level image operations.
//!
//! These functions combine calculations with backend parameters. Planning is
//! separated from execution so the process stage can consult the cache
//! between the two.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{ResponsiveSize, calculate_responsive_sizes};
use super::params::{OutputFormat, Quality, ResizeParams};
use crate::config::ImagesConfig;
use std::path::Path;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32), BackendError> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for responsive variant generation.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    pub widths: Vec<u32>,
    pub formats: Vec<OutputFormat>,
    pub quality: Quality,
}

impl VariantConfig {
    pub fn from_images_config(images: &ImagesConfig) -> Self {
        Self {
            widths: images.widths.clone(),
            formats: images.formats.clone(),
            quality: Quality::new(images.quality),
        }
    }
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::from_images_config(&ImagesConfig::default())
    }
}

/// A variant to generate: backend parameters plus the output file name.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVariant {
    pub params: ResizeParams,
    pub file_name: String,
}

/// Plan every variant for one source image without executing anything.
///
/// Variants are ordered by width, then by configured format order. File
/// names follow `{stem}-{width}.{ext}`.
pub fn plan_variants(
    source: &Path,
    output_dir: &Path,
    filename_stem: &str,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> Vec<PlannedVariant> {
    let sizes = calculate_responsive_sizes(original_dims, &config.widths);
    let mut planned = Vec::with_capacity(sizes.len() * config.formats.len());

    for ResponsiveSize { width, height } in sizes {
        for &format in &config.formats {
            let file_name = format!("{}-{}.{}", filename_stem, width, format.extension());
            planned.push(PlannedVariant {
                params: ResizeParams {
                    source: source.to_path_buf(),
                    output: output_dir.join(&file_name),
                    width,
                    height,
                    format,
                    quality: config.quality,
                },
                file_name,
            });
        }
    }

    planned
}
