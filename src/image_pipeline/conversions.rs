//! Pipeline conversions module
//!
//! Orchestrates the page loop that turns a multi-page TIFF into an indexed
//! grayscale TIFF.

mod report;
mod tiff_to_grayscale;


pub use report::{ConversionReport, PageReport, PipelineTimings, StepTiming};
pub use tiff_to_grayscale::TiffGrayscalePipeline;
