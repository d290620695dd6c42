//! Image aspect-ratio classification.
//!
//! | ratio (width / height) | class |
//! |---|---|
//! | `< 0.7` | portrait |
//! | `0.7 ..< 1.3` | square |
//! | `1.3 ..< 1.8` | landscape |
//! | `>= 1.8` | panorama |
//!
//! Boundaries belong to the upper bucket. Classification of an image file
//! never fails: unreadable files fall back to [`AspectClass::Landscape`] so a
//! bad image header cannot break a page.

use crate::imaging::ImageBackend;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AspectClass {
    Portrait,
    Square,
    #[default]
    Landscape,
    Panorama,
}

impl AspectClass {
    /// Lowercase label, used as a CSS class on photo tiles.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Square => "square",
            Self::Landscape => "landscape",
            Self::Panorama => "panorama",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SQUARE_MIN: f64 = 0.7;
const LANDSCAPE_MIN: f64 = 1.3;
const PANORAMA_MIN: f64 = 1.8;

/// Classify a width/height ratio.
///
/// Non-finite and non-positive ratios cannot come from a real image and
/// map to the default class.
pub fn classify_ratio(ratio: f64) -> AspectClass {
    if !ratio.is_finite() || ratio <= 0.0 {
        return AspectClass::default();
    }
    if ratio < SQUARE_MIN {
        AspectClass::Portrait
    } else if ratio < LANDSCAPE_MIN {
        AspectClass::Square
    } else if ratio < PANORAMA_MIN {
        AspectClass::Landscape
    } else {
        AspectClass::Panorama
    }
}

/// Classify pixel dimensions. A zero dimension yields the default class.
pub fn classify_dimensions(width: u32, height: u32) -> AspectClass {
    if width == 0 || height == 0 {
        return AspectClass::default();
    }
    classify_ratio(width as f64 / height as f64)
}

/// Classify an image file by reading its dimensions through `backend`.
///
/// Any read failure yields [`AspectClass::Landscape`] and a warning.
pub fn classify_image(backend: &impl ImageBackend, path: &Path) -> AspectClass {
    match backend.identify(path) {
        Ok(dims) => classify_dimensions(dims.width, dims.height),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read image dimensions, assuming landscape");
            AspectClass::default()
        }
    }
}
