//! File-name and URL-slug conventions.
//!
//! Content files may carry a date prefix (`YYYY-MM-DD-`) so that directory
//! listings sort chronologically. The prefix is not part of the page URL:
//!
//! - `2024-05-01-first-light.md` → slug `first-light`
//! - `harbour-at-dusk.md` → slug `harbour-at-dusk`
//! - `2024-05-01.md` → slug `2024-05-01` (nothing left after the prefix)
//!
//! Tags become URL segments through [`slugify`].

use chrono::NaiveDate;

/// Result of parsing a content file stem like `2024-05-01-first-light`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Date prefix if present and a valid calendar date.
    pub date: Option<NaiveDate>,
    /// URL slug: the stem with the date prefix removed.
    pub slug: String,
}

const DATE_PREFIX_LEN: usize = "YYYY-MM-DD".len();

/// Parse a file stem following the optional `YYYY-MM-DD-name` convention.
pub fn parse_file_stem(stem: &str) -> ParsedName {
    if let Some(prefix) = stem.get(..DATE_PREFIX_LEN)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        let rest = &stem[DATE_PREFIX_LEN..];
        if let Some(name) = rest.strip_prefix('-')
            && !name.is_empty()
        {
            return ParsedName {
                date: Some(date),
                slug: name.to_string(),
            };
        }
        if rest.is_empty() {
            return ParsedName {
                date: Some(date),
                slug: stem.to_string(),
            };
        }
    }
    ParsedName {
        date: None,
        slug: stem.to_string(),
    }
}

/// Turn free text (a tag, a title) into a URL-safe slug.
///
/// Lowercases, keeps alphanumeric characters, replaces everything else with
/// single dashes and trims dashes from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
