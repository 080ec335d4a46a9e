//! Grayscale conversion module
//!
//! Palette construction, per-page resolution metadata and the
//! resample/remap steps applied to each page.

pub mod metadata;
pub mod palette;
pub mod remap;
pub mod types;

pub use metadata::{PageMetadata, PageTags, Rational, ResolutionUnit};
pub use palette::GrayscalePalette;
pub use types::{GrayscalePage, IndexedRaster, ResampleFilter, SourcePage};
