//! Image processing pipeline module
//!
//! This module converts multi-page TIFF files to indexed grayscale, with
//! separate modules for TIFF reading/writing, grayscale conversion and
//! conversion orchestration.

pub mod common;
pub mod conversions;
pub mod grayscale;
pub mod tiff;

pub use common::{
    ConversionError,
    Result,
};

pub use grayscale::{
    GrayscalePalette,
    PageMetadata,
    Rational,
    ResampleFilter,
    ResolutionUnit,
};

pub use self::tiff::{
    TiffCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    TiffPageReader,
    TiffWriter,
    StandardTiffReader,
    StandardTiffWriter,
};

pub use conversions::{
    ConversionReport,
    PageReport,
    TiffGrayscalePipeline,
};
