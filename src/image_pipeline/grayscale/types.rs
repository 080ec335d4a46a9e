//! Types for grayscale conversion

use image::DynamicImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::grayscale::metadata::{PageMetadata, PageTags};
use crate::image_pipeline::grayscale::palette::GrayscalePalette;

/// Resampling filter used when a page is brought to the target DPI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    /// Nearest neighbour (fastest, default)
    Nearest,
    /// Bilinear
    Triangle,
    /// Cubic
    CatmullRom,
    /// Lanczos with window 3 (slowest, sharpest)
    Lanczos3,
}

/// A decoded source page
#[derive(Debug)]
pub struct SourcePage {
    /// Zero-based position in the source file
    pub index: usize,
    /// Decoded pixels at their original depth
    pub image: DynamicImage,
    /// Tags read from the page's IFD, or why they could not be read
    pub tags: Result<PageTags>,
}

/// One palette index per pixel, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRaster {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>,
}

/// A converted page ready to be appended to the output
#[derive(Debug, Clone)]
pub struct GrayscalePage<'a> {
    pub index: usize,
    pub raster: IndexedRaster,
    pub metadata: PageMetadata,
    pub palette: &'a GrayscalePalette,
}
