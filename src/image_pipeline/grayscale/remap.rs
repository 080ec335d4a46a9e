use image::imageops::{self, FilterType};
use image::DynamicImage;
use tracing::debug;

use crate::image_pipeline::grayscale::palette::GrayscalePalette;
use crate::image_pipeline::grayscale::types::{IndexedRaster, ResampleFilter};

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

pub fn resample(image: &DynamicImage, width: u32, height: u32, filter: ResampleFilter) -> DynamicImage {
    debug!(
        "Resampling {}x{} -> {}x{} ({:?})",
        image.width(),
        image.height(),
        width,
        height,
        filter
    );
    DynamicImage::ImageLumaA8(imageops::resize(
        &image.to_luma_alpha8(),
        width,
        height,
        filter.into(),
    ))
}

/// Maps every pixel to the nearest palette entry. Transparent areas are
/// composited over black, the palette's first entry.
pub fn remap_to_palette(image: &DynamicImage, palette: &GrayscalePalette) -> IndexedRaster {
    let gray = image.to_luma_alpha8();
    let (width, height) = gray.dimensions();

    let indices = gray
        .pixels()
        .map(|pixel| {
            let [luma, alpha] = pixel.0;
            let composited = (luma as u16 * alpha as u16 + 127) / 255;
            palette.index_of(composited as u8)
        })
        .collect();

    IndexedRaster {
        width,
        height,
        indices,
    }
}
