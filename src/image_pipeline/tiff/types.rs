//! TIFF conversion configuration types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::grayscale::metadata::DEFAULT_DPI;
use crate::image_pipeline::grayscale::palette::MAX_GRAY_LEVELS;
use crate::image_pipeline::grayscale::types::ResampleFilter;

/// Deflate level for the output pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced (default)
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl From<TiffCompression> for tiff::encoder::Compression {
    fn from(compression: TiffCompression) -> Self {
        use tiff::encoder::compression::DeflateLevel;

        match compression {
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => {
                tiff::encoder::Compression::Deflate(DeflateLevel::Balanced)
            }
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
        }
    }
}

/// Configuration for TIFF to indexed grayscale conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Number of gray levels in the output palette (1-16)
    pub gray_levels: u8,
    /// Horizontal resolution every page is brought to
    pub target_dpi: u32,
    /// Compression level to use
    pub compression: TiffCompression,
    /// Filter used when a page has to be rescaled
    pub resample_filter: ResampleFilter,
    /// Whether to reject pages with a zero dimension
    pub validate_dimensions: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            gray_levels: MAX_GRAY_LEVELS,
            target_dpi: DEFAULT_DPI,
            compression: TiffCompression::DeflateBalanced,
            resample_filter: ResampleFilter::Nearest,
            validate_dimensions: true,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.gray_levels == 0 || self.gray_levels > MAX_GRAY_LEVELS {
            return Err(ConversionError::InvalidGrayLevels(self.gray_levels));
        }
        if self.target_dpi == 0 {
            return Err(ConversionError::InvalidTargetDpi(self.target_dpi));
        }
        Ok(())
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    gray_levels: Option<u8>,
    target_dpi: Option<u32>,
    compression: Option<TiffCompression>,
    resample_filter: Option<ResampleFilter>,
    validate_dimensions: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn gray_levels(mut self, levels: u8) -> Self {
        self.gray_levels = Some(levels);
        self
    }

    pub fn target_dpi(mut self, dpi: u32) -> Self {
        self.target_dpi = Some(dpi);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn resample_filter(mut self, filter: ResampleFilter) -> Self {
        self.resample_filter = Some(filter);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            gray_levels: self.gray_levels.unwrap_or(default.gray_levels),
            target_dpi: self.target_dpi.unwrap_or(default.target_dpi),
            compression: self.compression.unwrap_or(default.compression),
            resample_filter: self.resample_filter.unwrap_or(default.resample_filter),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
