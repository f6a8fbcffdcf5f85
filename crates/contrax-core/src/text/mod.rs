//! Transcript acquisition and normalization.

mod acquirer;
mod normalize;

pub use acquirer::{AcquiredText, TextAcquirer, TextSource};
pub use normalize::normalize_whitespace;
