//! # Folio
//!
//! A static site generator for a personal blog and photo portfolio.
//! Markdown files with YAML front matter are the data source: one directory
//! of posts, one of photos, and a `config.toml` wiring them together.
//!
//! # Architecture
//!
//! A build is one pass over the content root, with no intermediate files
//! beyond the image cache:
//!
//! ```text
//! 1. Load      config.toml + posts/*.md + photos/*.md  →  SiteConfig, Collections
//! 2. Copy      styles/, img/                            →  _site/ (byte-for-byte)
//! 3. Process   front-matter `image:` sources            →  responsive variants, ImageSet
//! 4. Render    collections + ImageSet                   →  _site/**/index.html
//! 5. Feed      posts                                    →  _site/feed.xml
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | The pipeline above, plus `check` (validate without writing) |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation, color CSS |
//! | [`content`] | One markdown file: front-matter split and typed fields |
//! | [`collection`] | Glob a directory into an ordered sequence of content items |
//! | [`naming`] | `YYYY-MM-DD-slug` file-name convention and slugification |
//! | [`filters`] | Presentation helpers: date formatting, random pick, aspect classification |
//! | [`imaging`] | Pure-Rust image operations behind the [`imaging::ImageBackend`] trait |
//! | [`process`] | Responsive variant generation for every referenced image |
//! | [`cache`] | Content-addressed cache so unchanged images are not re-encoded |
//! | [`shortcode`] | `<picture>` markup for a processed image |
//! | [`render`] | HTML pages with Maud |
//! | [`feed`] | RSS feed of posts |
//! | [`passthrough`] | Verbatim copy of static directories |
//! | [`serve`] | Local preview server for the output directory |
//! | [`output`] | CLI output formatting |
//!
//! # Collection Order
//!
//! A collection is the reverse of the file-name order of its directory, not
//! a sort by date. Naming files `2024-05-01-title.md` makes the two agree,
//! and the date prefix doubles as the post date when front matter has none.
//!
//! # Failure Policy
//!
//! Bad content fails the build loudly: malformed front matter, a missing
//! required field, a referenced image that does not exist, two items with
//! the same slug. The one exception is aspect classification, which falls
//! back to `landscape` when an image cannot be measured.

pub mod cache;
pub mod collection;
pub mod config;
pub mod content;
pub mod feed;
pub mod filters;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod passthrough;
pub mod process;
pub mod render;
pub mod serve;
pub mod shortcode;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;
