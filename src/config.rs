//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is sparse: stock defaults are overridden by whatever
//! keys the user sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! passthrough = ["styles", "img"]   # Copied byte-for-byte into the output
//!
//! [site]
//! title = "Folio"
//! author = ""
//! description = ""
//! base_url = "http://localhost:8080"
//! language = "en"
//! recent_posts = 5                   # Posts listed on the home page
//!
//! [collections.posts]
//! dir = "posts"
//! pattern = "*.md"
//!
//! [collections.photos]
//! dir = "photos"
//! pattern = "*.md"
//!
//! [images]
//! widths = [400, 800, 1600]          # Responsive widths to generate
//! formats = ["avif", "jpeg"]         # Last format is the <img> fallback
//! quality = 80                       # Lossy encoding quality (1-100)
//! output_dir = "img/generated"       # Relative to the output directory
//! sizes = "(max-width: 800px) 100vw, 800px"
//!
//! [colors.light]
//! background = "#fbfaf7"
//! text = "#1d1c1a"
//! text_muted = "#6b6760"
//! border = "#e4e0d8"
//! link = "#2f5d8a"
//! link_hover = "#173b5e"
//!
//! [colors.dark]
//! background = "#161513"
//! text = "#e8e5df"
//! text_muted = "#9a958c"
//! border = "#33312d"
//! link = "#8fb8e0"
//! link_hover = "#c3dcf3"
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 8080
//!
//! [processing]
//! max_processes = 4                  # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content-root subdirectories copied unmodified into the output tree.
    pub passthrough: Vec<String>,
    /// Site-wide metadata shown in page chrome and the feed.
    pub site: SiteMeta,
    /// Where the two content collections live.
    pub collections: CollectionsConfig,
    /// Responsive image generation settings.
    pub images: ImagesConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Development preview server.
    pub serve: ServeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if self.images.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "images.widths values must be non-zero".into(),
            ));
        }
        if self.images.formats.is_empty() {
            return Err(ConfigError::Validation(
                "images.formats must not be empty".into(),
            ));
        }
        let unique: HashSet<_> = self.images.formats.iter().collect();
        if unique.len() != self.images.formats.len() {
            return Err(ConfigError::Validation(
                "images.formats must not repeat a format".into(),
            ));
        }
        if self.collections.posts.dir == self.collections.photos.dir {
            return Err(ConfigError::Validation(
                "collections.posts.dir and collections.photos.dir must differ".into(),
            ));
        }
        if self.site.recent_posts == 0 {
            return Err(ConfigError::Validation(
                "site.recent_posts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            passthrough: vec!["styles".to_string(), "img".to_string()],
            site: SiteMeta::default(),
            collections: CollectionsConfig::default(),
            images: ImagesConfig::default(),
            colors: ColorConfig::default(),
            serve: ServeConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

/// Site-wide metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Absolute URL the site is published at. Used for feed links.
    pub base_url: String,
    pub language: String,
    /// Number of posts listed on the home page.
    pub recent_posts: usize,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            author: String::new(),
            description: String::new(),
            base_url: "http://localhost:8080".to_string(),
            language: "en".to_string(),
            recent_posts: 5,
        }
    }
}

/// One collection: a directory under the content root and a glob pattern
/// matched against paths relative to that directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub dir: String,
    pub pattern: String,
}

impl CollectionConfig {
    pub fn new(dir: &str, pattern: &str) -> Self {
        Self {
            dir: dir.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsConfig {
    pub posts: CollectionConfig,
    pub photos: CollectionConfig,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            posts: CollectionConfig::new("posts", "*.md"),
            photos: CollectionConfig::new("photos", "*.md"),
        }
    }
}

/// Responsive image generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Pixel widths to generate. Widths larger than the source are skipped.
    pub widths: Vec<u32>,
    /// Output formats. The last one is used for the `<img>` fallback.
    pub formats: Vec<OutputFormat>,
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Directory, relative to the output root, receiving generated variants.
    pub output_dir: String,
    /// Value of the `sizes` attribute on generated `<img>`/`<source>` tags.
    pub sizes: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![400, 800, 1600],
            formats: vec![OutputFormat::Avif, OutputFormat::Jpeg],
            quality: 80,
            output_dir: "img/generated".to_string(),
            sizes: "(max-width: 800px) 100vw, 800px".to_string(),
        }
    }
}

/// Development preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub interface: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Muted/secondary text color (dates, captions, photo settings).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fbfaf7".to_string(),
            text: "#1d1c1a".to_string(),
            text_muted: "#6b6760".to_string(),
            border: "#e4e0d8".to_string(),
            link: "#2f5d8a".to_string(),
            link_hover: "#173b5e".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#161513".to_string(),
            text: "#e8e5df".to_string(),
            text_muted: "#9a958c".to_string(),
            border: "#33312d".to_string(),
            link: "#8fb8e0".to_string(),
            link_hover: "#c3dcf3".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Content-root subdirectories copied byte-for-byte into the output.
passthrough = ["styles", "img"]

# ---------------------------------------------------------------------------
# Site metadata
# ---------------------------------------------------------------------------
[site]
title = "Folio"
author = ""
description = ""
# Absolute URL the site is published at (used in feed.xml links).
base_url = "http://localhost:8080"
language = "en"
# Number of posts listed on the home page.
recent_posts = 5

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Each collection is every file under `dir` matching `pattern`, listed in
# reverse file-name order. Name files with a date prefix
# (2024-05-01-title.md) to get newest-first listings.
[collections.posts]
dir = "posts"
pattern = "*.md"

[collections.photos]
dir = "photos"
pattern = "*.md"

# ---------------------------------------------------------------------------
# Responsive images
# ---------------------------------------------------------------------------
[images]
# Pixel widths to generate. Widths larger than the source are skipped.
widths = [400, 800, 1600]
# Output formats: "avif", "jpeg", "png". The last one is the <img> fallback.
formats = ["avif", "jpeg"]
# Lossy encoding quality (1 = worst, 100 = best).
quality = 80
# Where generated variants are written, relative to the output directory.
output_dir = "img/generated"
# The `sizes` attribute emitted on responsive images.
sizes = "(max-width: 800px) 100vw, 800px"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fbfaf7"
text = "#1d1c1a"
text_muted = "#6b6760"    # Dates, captions, photo settings
border = "#e4e0d8"
link = "#2f5d8a"
link_hover = "#173b5e"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#161513"
text = "#e8e5df"
text_muted = "#9a958c"
border = "#33312d"
link = "#8fb8e0"
link_hover = "#c3dcf3"

# ---------------------------------------------------------------------------
# Development preview (`folio serve`)
# ---------------------------------------------------------------------------
[serve]
interface = "127.0.0.1"
port = 8080

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for image encoding and page rendering.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

impl ColorScheme {
    /// `--color-*` declarations, one per line, at the given indent.
    fn css_declarations(&self, indent: &str) -> String {
        [
            ("bg", &self.background),
            ("text", &self.text),
            ("text-muted", &self.text_muted),
            ("border", &self.border),
            ("link", &self.link),
            ("link-hover", &self.link_hover),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
        .collect()
    }
}

/// Generate CSS custom properties from color config.
///
/// Light colors go on `:root`; dark colors override them under
/// `prefers-color-scheme: dark`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        colors.light.css_declarations("    "),
        colors.dark.css_declarations("        "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_collections() {
        let config = SiteConfig::default();
        assert_eq!(config.collections.posts, CollectionConfig::new("posts", "*.md"));
        assert_eq!(
            config.collections.photos,
            CollectionConfig::new("photos", "*.md")
        );
    }

    #[test]
    fn default_config_has_image_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.images.widths, vec![400, 800, 1600]);
        assert_eq!(
            config.images.formats,
            vec![OutputFormat::Avif, OutputFormat::Jpeg]
        );
        assert_eq!(config.images.quality, 80);
        assert_eq!(config.images.output_dir, "img/generated");
    }

    #[test]
    fn default_passthrough_dirs() {
        let config = SiteConfig::default();
        assert_eq!(config.passthrough, vec!["styles", "img"]);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[site]
title = "Field Notes"

[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title, "Field Notes");
        assert_eq!(config.site.recent_posts, 5);
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#1d1c1a");
        assert_eq!(config.images.widths, vec![400, 800, 1600]);
    }

    #[test]
    fn parse_formats_lowercase() {
        let toml = r#"
[images]
formats = ["png"]
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.images.formats, vec![OutputFormat::Png]);
    }

    #[test]
    fn unknown_format_rejected() {
        let toml = r#"
[images]
formats = ["gif"]
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("    --color-link-hover: #173b5e;\n"));
        assert!(css.contains("        --color-text-muted: #9a958c;\n"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Folio");
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
passthrough = ["css"]

[collections.posts]
dir = "writing"
pattern = "**/*.md"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.passthrough, vec!["css"]);
        assert_eq!(
            config.collections.posts,
            CollectionConfig::new("writing", "**/*.md")
        );
        assert_eq!(config.collections.photos.dir, "photos");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[images]
qualty = 90
"#,
        )
        .unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[theme]\ngap = \"1rem\"\n");
        assert!(result.is_err());
        let result: Result<SiteConfig, _> = toml::from_str("[collections.drafts]\ndir = \"d\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[images]
quality = 200
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[images]
widths = [400, 800]
quality = 80
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[images]
quality = 70
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let images = merged.get("images").unwrap();
        assert_eq!(images.get("quality").unwrap().as_integer(), Some(70));
        assert_eq!(images.get("widths").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn merge_toml_arrays_replace_not_append() {
        let base: toml::Value = toml::from_str(r#"passthrough = ["styles", "img"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"passthrough = ["fonts"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        let list = merged.get("passthrough").unwrap().as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].as_str(), Some("fonts"));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = SiteConfig::default();
        config.images.quality = 100;
        assert!(config.validate().is_ok());
        config.images.quality = 1;
        assert!(config.validate().is_ok());
        config.images.quality = 0;
        assert!(config.validate().is_err());
        config.images.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_widths() {
        let mut config = SiteConfig::default();
        config.images.widths = vec![];
        assert!(config.validate().is_err());
        config.images.widths = vec![400, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_formats() {
        let mut config = SiteConfig::default();
        config.images.formats = vec![];
        assert!(config.validate().is_err());
        config.images.formats = vec![OutputFormat::Jpeg, OutputFormat::Jpeg];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_collections_must_be_disjoint() {
        let mut config = SiteConfig::default();
        config.collections.photos.dir = "posts".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("collections"));
    }

    #[test]
    fn validate_recent_posts_nonzero() {
        let mut config = SiteConfig::default();
        config.site.recent_posts = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.passthrough, defaults.passthrough);
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.site.recent_posts, defaults.site.recent_posts);
        assert_eq!(config.collections.posts, defaults.collections.posts);
        assert_eq!(config.collections.photos, defaults.collections.photos);
        assert_eq!(config.images.widths, defaults.images.widths);
        assert_eq!(config.images.formats, defaults.images.formats);
        assert_eq!(config.images.quality, defaults.images.quality);
        assert_eq!(config.images.sizes, defaults.images.sizes);
        assert_eq!(config.colors.dark.background, "#161513");
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in [
            "passthrough",
            "site",
            "collections",
            "images",
            "colors",
            "serve",
            "processing",
        ] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str(
            r#"
[images]
quality = 70
"#,
        )
        .unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.images.quality, 70);
        assert_eq!(config.images.widths, vec![400, 800, 1600]);
    }
}
