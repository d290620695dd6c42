//! Content files: YAML front matter followed by a markdown body.
//!
//! ```text
//! ---
//! title: Harbour at dusk
//! date: 2024-05-01
//! tags: [harbour, night]
//! image: img/harbour.jpg
//! camera: X100V
//! ---
//! Markdown body.
//! ```
//!
//! `title` is required. `date` is required unless the file name carries a
//! `YYYY-MM-DD-` prefix, which then supplies it. Dates are normalized to UTC
//! at parse time:
//!
//! | Front matter | Instant |
//! |---|---|
//! | `2024-05-01` | midnight UTC |
//! | `2024-05-01T10:00:00+02:00` | converted to UTC |
//! | `2024-05-01T10:00[:00]`, `2024-05-01 10:00[:00]` | taken as UTC |
//!
//! `tags` may be a single value or a list. Numeric and boolean tags keep
//! their text. Unknown keys are ignored so files written for other tools
//! keep working.

use crate::naming;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: missing opening `---` front-matter delimiter", .0.display())]
    MissingOpeningDelimiter(PathBuf),
    #[error("{}: missing closing `---` front-matter delimiter", .0.display())]
    MissingClosingDelimiter(PathBuf),
    #[error("{}: invalid front matter: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
    #[error("{}: missing required field `{field}`", .path.display())]
    MissingField { path: PathBuf, field: &'static str },
    #[error("{}: unrecognised date `{value}`", .path.display())]
    InvalidDate { path: PathBuf, value: String },
    #[error("{}: `tags` must be a string or a list of strings", .0.display())]
    InvalidTags(PathBuf),
}

/// One parsed post or photo.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub title: String,
    pub date: DateTime<Utc>,
    pub tags: BTreeSet<String>,
    pub location: Option<String>,
    /// Image path relative to the content root.
    pub image: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub settings: Option<String>,
    /// File stem with any date prefix stripped.
    pub slug: String,
    /// Path of the source file relative to the content root.
    pub source_path: PathBuf,
    /// Raw markdown after the closing delimiter.
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
    tags: Option<Value>,
    location: Option<String>,
    image: Option<String>,
    camera: Option<String>,
    lens: Option<String>,
    settings: Option<String>,
}

/// `tags` as written: one scalar or a list of scalars. Numbers and booleans
/// (`tags: [2023, film]`) keep their YAML text; nested lists and mappings
/// are rejected.
fn parse_tags(value: Value, path: &Path) -> Result<BTreeSet<String>, ContentError> {
    let items = match value {
        Value::Sequence(items) => items,
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    };
    let mut tags = BTreeSet::new();
    for item in items {
        let tag = match item {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            _ => return Err(ContentError::InvalidTags(path.to_path_buf())),
        };
        let tag = tag.trim();
        if !tag.is_empty() {
            tags.insert(tag.to_string());
        }
    }
    Ok(tags)
}

impl ContentItem {
    /// Read and parse `path`, recording it relative to `root`.
    pub fn load(root: &Path, path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let relative = path.strip_prefix(root).unwrap_or(path);
        Self::parse(&text, relative)
    }

    /// Parse file contents. `source_path` supplies the slug and error context.
    pub fn parse(text: &str, source_path: &Path) -> Result<Self, ContentError> {
        let (yaml, body) = split_front_matter(text, source_path)?;
        let front: FrontMatter = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml_ng::from_str(yaml).map_err(|source| ContentError::Yaml {
                path: source_path.to_path_buf(),
                source,
            })?
        };

        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = naming::parse_file_stem(&stem);

        let missing = |field| ContentError::MissingField {
            path: source_path.to_path_buf(),
            field,
        };
        let title = front
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| missing("title"))?;
        let date = match front.date {
            Some(value) => parse_date(&value).ok_or_else(|| ContentError::InvalidDate {
                path: source_path.to_path_buf(),
                value,
            })?,
            None => name
                .date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| n.and_utc())
                .ok_or_else(|| missing("date"))?,
        };

        let tags = match front.tags {
            Some(value) => parse_tags(value, source_path)?,
            None => BTreeSet::new(),
        };

        Ok(Self {
            title,
            date,
            tags,
            location: front.location,
            image: front.image,
            camera: front.camera,
            lens: front.lens,
            settings: front.settings,
            slug: name.slug,
            source_path: source_path.to_path_buf(),
            body: body.to_string(),
        })
    }
}

/// Split `---\n<yaml>\n---\n<body>`. The closing delimiter is the first
/// line consisting only of `---`.
fn split_front_matter<'a>(text: &'a str, path: &Path) -> Result<(&'a str, &'a str), ContentError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix("---")
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
        .ok_or_else(|| ContentError::MissingOpeningDelimiter(path.to_path_buf()))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(ContentError::MissingClosingDelimiter(path.to_path_buf()))
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a front-matter date into a UTC instant.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
