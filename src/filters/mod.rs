//! Presentation filters used by the page templates.
//!
//! All filters are pure: no I/O beyond reading image headers, no shared
//! state, safe to call concurrently from rayon workers.
//!
//! | Filter | Function |
//! |---|---|
//! | Date → `yyyy-MM-dd` (UTC) | [`format_date`] |
//! | Random element | [`pick_random`] |
//! | Image aspect label | [`classify_image`] |

mod aspect;
mod date;
mod random;

pub use aspect::{AspectClass, classify_dimensions, classify_image, classify_ratio};
pub use date::{format_date, format_rfc2822};
pub use random::{pick_random, pick_random_with};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("cannot pick a random element from an empty sequence")]
    EmptySequence,
}
