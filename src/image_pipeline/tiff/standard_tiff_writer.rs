use std::io::{Seek, Write};

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::{PhotometricInterpretation, ResolutionUnit, Tag};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::grayscale::palette::INDEX_BITS;
use crate::image_pipeline::grayscale::types::GrayscalePage;
use crate::image_pipeline::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

fn encode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::EncodeError(e.to_string())
}

impl TiffWriter for StandardTiffWriter {
    fn write_page<W: Write + Seek>(
        &self,
        encoder: &mut TiffEncoder<W>,
        page: &GrayscalePage<'_>,
    ) -> Result<()> {
        let raster = &page.raster;
        debug!("Encoding page {}: {}x{}", page.index, raster.width, raster.height);

        // The encoder has no sub-byte color type: hand it the packed rows as
        // 8-bit samples, then describe the real layout in the directory.
        let packed = pack_indices(&raster.indices, raster.width, raster.height);
        let mut image = encoder
            .new_image::<colortype::Gray8>(packed_row_bytes(raster.width), raster.height)
            .map_err(encode_error)?;

        {
            let directory = image.encoder();
            directory
                .write_tag(Tag::ImageWidth, raster.width)
                .map_err(encode_error)?;
            directory
                .write_tag(Tag::BitsPerSample, INDEX_BITS)
                .map_err(encode_error)?;
            directory
                .write_tag(
                    Tag::PhotometricInterpretation,
                    PhotometricInterpretation::RGBPalette.to_u16(),
                )
                .map_err(encode_error)?;
            directory
                .write_tag(Tag::ColorMap, &page.palette.color_map()[..])
                .map_err(encode_error)?;
            directory
                .write_tag(Tag::DateTime, page.metadata.timestamp.as_str())
                .map_err(encode_error)?;
        }

        image.resolution_unit(ResolutionUnit::Inch);
        image.x_resolution(page.metadata.x_resolution.into());
        image.y_resolution(page.metadata.y_resolution.into());

        image.write_data(&packed).map_err(encode_error)?;

        debug!("Page {} encoded, {} bytes of pixel data", page.index, packed.len());
        Ok(())
    }
}

fn packed_row_bytes(width: u32) -> u32 {
    (width * INDEX_BITS as u32).div_ceil(8)
}

/// Packs 4-bit indices two per byte, high nibble first, each row starting on
/// a fresh byte.
fn pack_indices(indices: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row_bytes = packed_row_bytes(width) as usize;
    let mut packed = vec![0u8; row_bytes * height as usize];

    for (row, out) in indices
        .chunks(width as usize)
        .zip(packed.chunks_mut(row_bytes))
    {
        for (pair, byte) in row.chunks(2).zip(out.iter_mut()) {
            let high = pair[0] & 0x0F;
            let low = pair.get(1).map_or(0, |v| v & 0x0F);
            *byte = high << 4 | low;
        }
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::grayscale::{
        GrayscalePalette, IndexedRaster, PageMetadata, Rational,
    };
    use std::io::Cursor;
    use tiff::decoder::ifd::Value;
    use tiff::decoder::Decoder;

    #[test]
    fn test_pack_even_width() {
        assert_eq!(pack_indices(&[1, 2, 3, 4], 4, 1), vec![0x12, 0x34]);
    }

    #[test]
    fn test_pack_odd_width_pads_rows() {
        let packed = pack_indices(&[1, 2, 3, 15, 14, 13], 3, 2);
        assert_eq!(packed, vec![0x12, 0x30, 0xFE, 0xD0]);
    }

    #[test]
    fn test_written_directory() {
        let palette = GrayscalePalette::new(16).unwrap();
        let page = GrayscalePage {
            index: 0,
            raster: IndexedRaster {
                width: 5,
                height: 2,
                indices: vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            },
            metadata: PageMetadata {
                x_resolution: Rational::whole(150),
                y_resolution: Rational::whole(75),
                timestamp: "2020:01:02 03:04:05".to_string(),
                ..PageMetadata::default()
            },
            palette: &palette,
        };

        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut out).unwrap();
            StandardTiffWriter.write_page(&mut encoder, &page).unwrap();
        }
        out.set_position(0);

        let mut decoder = Decoder::new(out).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (5, 2));
        assert_eq!(decoder.get_tag_u32(Tag::BitsPerSample).unwrap(), 4);
        assert_eq!(
            decoder.get_tag_u32(Tag::PhotometricInterpretation).unwrap(),
            PhotometricInterpretation::RGBPalette.to_u16() as u32
        );
        assert_eq!(decoder.get_tag_u16_vec(Tag::ColorMap).unwrap(), palette.color_map());
        assert_eq!(
            decoder.get_tag_ascii_string(Tag::DateTime).unwrap(),
            "2020:01:02 03:04:05"
        );
        assert_eq!(
            decoder.get_tag_u32(Tag::ResolutionUnit).unwrap(),
            ResolutionUnit::Inch.to_u16() as u32
        );
        assert!(matches!(
            decoder.get_tag(Tag::XResolution).unwrap(),
            Value::Rational(150, 1)
        ));
        assert!(matches!(
            decoder.get_tag(Tag::YResolution).unwrap(),
            Value::Rational(75, 1)
        ));
    }
}
