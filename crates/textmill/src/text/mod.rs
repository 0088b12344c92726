//! Text cleanup: page-boundary markers and output normalization.

mod normalize;

pub use normalize::{normalize, page_marker, strip_page_markers};
