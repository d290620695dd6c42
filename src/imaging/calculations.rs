//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Represents a single responsive width to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveSize {
    /// Output width in pixels.
    pub width: u32,
    /// Output height, preserving the source aspect ratio.
    pub height: u32,
}

/// Calculate which responsive widths to generate and their dimensions.
///
/// Filters out widths larger than the original, removes duplicates, and
/// sorts ascending. If every requested width exceeds the original, returns
/// the original size as the only entry so the page always has an image.
///
/// # Arguments
/// * `original` - Original image dimensions (width, height)
/// * `widths` - Requested output widths
pub fn calculate_responsive_sizes(original: (u32, u32), widths: &[u32]) -> Vec<ResponsiveSize> {
    let (orig_w, orig_h) = original;

    let mut targets: Vec<u32> = widths
        .iter()
        .copied()
        .filter(|&w| w > 0 && w <= orig_w)
        .collect();
    targets.sort_unstable();
    targets.dedup();

    if targets.is_empty() {
        return vec![ResponsiveSize {
            width: orig_w,
            height: orig_h,
        }];
    }

    targets
        .into_iter()
        .map(|width| ResponsiveSize {
            width,
            height: scaled_height(original, width),
        })
        .collect()
}

/// Height of `original` scaled to `width`, rounded, never below one pixel.
fn scaled_height((orig_w, orig_h): (u32, u32), width: u32) -> u32 {
    if orig_w == 0 {
        return orig_h;
    }
    let h = (orig_h as f64 * width as f64 / orig_w as f64).round() as u32;
    h.max(1)
}
