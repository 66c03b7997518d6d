//! Proof document pipeline: block-math normalization and step segmentation.
//!
//! Both halves are pure functions over `&str`. They never fail: markup they
//! do not recognize passes through as ordinary content.

mod normalize;
mod segment;

pub use normalize::{delimiter_count, has_unterminated_block, normalize};
pub use segment::{page_at, segment, step_number};
