use std::io::{Seek, Write};

use tiff::encoder::TiffEncoder;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::grayscale::types::GrayscalePage;

pub trait TiffWriter {
    /// Appends one page as a new IFD of `encoder`.
    fn write_page<W: Write + Seek>(
        &self,
        encoder: &mut TiffEncoder<W>,
        page: &GrayscalePage<'_>,
    ) -> Result<()>;
}
