//! TIFF reading and writing module
//!
//! Multi-page decoding into per-page rasters and tags, and 4-bit indexed
//! Deflate encoding of converted pages.

mod reader;
mod standard_tiff_reader;
mod standard_tiff_writer;
pub mod types;
mod writer;

pub use reader::TiffPageReader;
pub use standard_tiff_reader::StandardTiffReader;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{ConversionConfig, ConversionConfigBuilder, TiffCompression};
pub use writer::TiffWriter;
