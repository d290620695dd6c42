//! Responsive image shortcode.
//!
//! Turns a processed image into `<picture>` markup. Variant generation has
//! already happened in [`process`](crate::process); this is a pure lookup
//! plus attribute passing, safe to call from any rendering thread.
//!
//! ```html
//! <picture>
//!   <source type="image/avif" srcset="/img/generated/a-400.avif 400w, …" sizes="…">
//!   <img src="/img/generated/a-1600.jpg" srcset="…" sizes="…"
//!        width="1600" height="1067" alt="…" loading="lazy" decoding="async">
//! </picture>
//! ```

use crate::process::ImageSet;
use maud::{Markup, html};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShortcodeError {
    #[error("image `{0}` was not processed")]
    NotProcessed(String),
}

/// Render `<picture>` for `src`.
///
/// One `<source>` per format except the last; the last format becomes the
/// `<img>` fallback at its largest width.
pub fn image(set: &ImageSet, src: &str, alt: &str, sizes: &str) -> Result<Markup, ShortcodeError> {
    let not_processed = || ShortcodeError::NotProcessed(src.to_string());
    let processed = set.get(src).ok_or_else(not_processed)?;
    let fallback = processed.fallback().ok_or_else(not_processed)?;
    let (_, sources) = processed.formats.split_last().ok_or_else(not_processed)?;

    Ok(html! {
        picture {
            @for format in sources {
                source type=(format.mime_type()) srcset=(processed.srcset(*format)) sizes=(sizes);
            }
            img src=(fallback.url)
                srcset=(processed.srcset(fallback.format))
                sizes=(sizes)
                width=(fallback.width)
                height=(fallback.height)
                alt=(alt)
                loading="lazy"
                decoding="async";
        }
    })
}
