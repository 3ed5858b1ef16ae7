//! Public value types for diagram lookups.

mod bundle;
mod image;

pub use bundle::ResultBundle;
pub use image::{Candidate, ImageResult, UNKNOWN_AUTHOR, UNKNOWN_LICENSE};
