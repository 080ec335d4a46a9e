//! Multi-page TIFF reader built on the `tiff` decoder.
//!
//! Each IFD is decoded into an [`image::DynamicImage`] so that the rest of the
//! pipeline works on one pixel representation regardless of the source depth.
//! Tags are read separately and a failure there never aborts the page.

use std::io::{Cursor, Read, Seek};

use image::{DynamicImage, ImageBuffer, Pixel};
use tiff::ColorType;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::{PhotometricInterpretation, Tag};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::grayscale::metadata::{PageTags, Rational};
use crate::image_pipeline::grayscale::types::SourcePage;
use crate::image_pipeline::tiff::reader::TiffPageReader;

pub struct StandardTiffReader;

impl TiffPageReader for StandardTiffReader {
    fn page_count(&self, data: &[u8]) -> Result<usize> {
        let mut decoder = open(data)?;
        let mut count = 1;
        while decoder.more_images() {
            decoder.next_image().map_err(decode_error)?;
            count += 1;
        }
        Ok(count)
    }

    fn read_pages(
        &self,
        data: &[u8],
        visit: &mut dyn FnMut(SourcePage) -> Result<()>,
    ) -> Result<()> {
        let mut decoder = open(data)?;
        let mut index = 0;

        loop {
            let tags = read_tags(&mut decoder);
            let image = read_raster(&mut decoder)?;
            debug!("Decoded page {}: {}x{}", index, image.width(), image.height());

            visit(SourcePage { index, image, tags })?;

            if !decoder.more_images() {
                return Ok(());
            }
            decoder.next_image().map_err(decode_error)?;
            index += 1;
        }
    }
}

fn open(data: &[u8]) -> Result<Decoder<Cursor<&[u8]>>> {
    debug!("Opening TIFF stream, {} bytes", data.len());
    Decoder::new(Cursor::new(data)).map_err(decode_error)
}

fn decode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

fn metadata_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::MetadataParseError(e.to_string())
}

fn read_tags<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<PageTags> {
    let resolution_unit = decoder
        .find_tag(Tag::ResolutionUnit)
        .map_err(metadata_error)?
        .map(Value::into_u16)
        .transpose()
        .map_err(metadata_error)?;

    let x_resolution = find_rational(decoder, Tag::XResolution)?;
    let y_resolution = find_rational(decoder, Tag::YResolution)?;

    let date_time = decoder
        .find_tag(Tag::DateTime)
        .map_err(metadata_error)?
        .map(Value::into_string)
        .transpose()
        .map_err(metadata_error)?;

    Ok(PageTags {
        resolution_unit,
        x_resolution,
        y_resolution,
        date_time,
    })
}

fn find_rational<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Rational>> {
    decoder
        .find_tag(tag)
        .map_err(metadata_error)?
        .map(rational)
        .transpose()
}

fn rational(value: Value) -> Result<Rational> {
    match value {
        Value::Rational(n, d) => Ok(Rational::new(n, d)),
        Value::List(mut values) if values.len() == 1 => rational(values.remove(0)),
        other => Err(ConversionError::MetadataParseError(format!(
            "expected a rational, found {other:?}"
        ))),
    }
}

fn read_raster<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<DynamicImage> {
    let (width, height) = decoder.dimensions().map_err(decode_error)?;
    let color_type = decoder.colortype().map_err(decode_error)?;
    let white_is_zero = decoder
        .find_tag(Tag::PhotometricInterpretation)
        .map_err(decode_error)?
        .map(Value::into_u16)
        .transpose()
        .map_err(decode_error)?
        == Some(PhotometricInterpretation::WhiteIsZero.to_u16());

    let color_map = match color_type {
        ColorType::Palette(_) => Some(decoder.get_tag_u16_vec(Tag::ColorMap).map_err(decode_error)?),
        _ => None,
    };

    let pixels = decoder.read_image().map_err(decode_error)?;

    let mut image = match (color_type, pixels) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => {
            DynamicImage::ImageLuma8(buffer(width, height, buf)?)
        }
        (ColorType::Gray(16), DecodingResult::U16(buf)) => {
            DynamicImage::ImageLuma16(buffer(width, height, buf)?)
        }
        (ColorType::Gray(bits @ (1 | 2 | 4)), DecodingResult::U8(buf)) => {
            let max = (1u16 << bits) - 1;
            let samples = unpack_samples(&buf, width, height, bits)?
                .into_iter()
                .map(|v| (v as u16 * 255 / max) as u8)
                .collect();
            DynamicImage::ImageLuma8(buffer(width, height, samples)?)
        }
        (ColorType::GrayA(8), DecodingResult::U8(buf)) => {
            DynamicImage::ImageLumaA8(buffer(width, height, buf)?)
        }
        (ColorType::GrayA(16), DecodingResult::U16(buf)) => {
            DynamicImage::ImageLumaA16(buffer(width, height, buf)?)
        }
        (ColorType::RGB(8), DecodingResult::U8(buf)) => {
            DynamicImage::ImageRgb8(buffer(width, height, buf)?)
        }
        (ColorType::RGB(16), DecodingResult::U16(buf)) => {
            DynamicImage::ImageRgb16(buffer(width, height, buf)?)
        }
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
            DynamicImage::ImageRgba8(buffer(width, height, buf)?)
        }
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => {
            DynamicImage::ImageRgba16(buffer(width, height, buf)?)
        }
        (ColorType::Palette(bits @ (1 | 2 | 4 | 8)), DecodingResult::U8(buf)) => {
            let indices = if bits == 8 {
                buf
            } else {
                unpack_samples(&buf, width, height, bits)?
            };
            let rgb = expand_palette(&indices, color_map.as_deref().unwrap_or_default(), bits)?;
            DynamicImage::ImageRgb8(buffer(width, height, rgb)?)
        }
        (ColorType::CMYK(8), DecodingResult::U8(buf)) => {
            let rgb = buf.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            DynamicImage::ImageRgb8(buffer(width, height, rgb)?)
        }
        (other, _) => {
            return Err(ConversionError::UnsupportedFormat(format!(
                "TIFF color type {other:?}"
            )));
        }
    };

    if white_is_zero && matches!(color_type, ColorType::Gray(_)) {
        image.invert();
    }

    Ok(image)
}

fn buffer<P: Pixel>(
    width: u32,
    height: u32,
    data: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    let len = data.len();
    ImageBuffer::from_raw(width, height, data).ok_or_else(|| {
        ConversionError::DecodeError(format!(
            "pixel buffer of {len} samples is too small for {width}x{height}"
        ))
    })
}

/// Splits rows of packed sub-byte samples (most significant bits first, each
/// row padded to a whole byte) into one byte per sample.
fn unpack_samples(packed: &[u8], width: u32, height: u32, bits: u8) -> Result<Vec<u8>> {
    let width = width as usize;
    let bits = bits as usize;
    let row_bytes = (width * bits).div_ceil(8);
    if packed.len() < row_bytes * height as usize {
        return Err(ConversionError::DecodeError(format!(
            "packed buffer of {} bytes is too small for {}x{} at {} bits",
            packed.len(),
            width,
            height,
            bits
        )));
    }

    let mask = ((1u16 << bits) - 1) as u8;
    let mut samples = Vec::with_capacity(width * height as usize);
    for row in packed.chunks(row_bytes).take(height as usize) {
        for x in 0..width {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            samples.push((row[bit / 8] >> shift) & mask);
        }
    }
    Ok(samples)
}

fn expand_palette(indices: &[u8], color_map: &[u16], bits: u8) -> Result<Vec<u8>> {
    let entries = 1usize << bits;
    if color_map.len() < entries * 3 {
        return Err(ConversionError::DecodeError(format!(
            "color map has {} values, expected {}",
            color_map.len(),
            entries * 3
        )));
    }

    let (red, rest) = color_map.split_at(entries);
    let (green, blue) = rest.split_at(entries);
    Ok(indices
        .iter()
        .flat_map(|&i| {
            let i = i as usize;
            [
                (red[i] >> 8) as u8,
                (green[i] >> 8) as u8,
                (blue[i] >> 8) as u8,
            ]
        })
        .collect())
}

fn cmyk_to_rgb(cmyk: &[u8]) -> [u8; 3] {
    let k = 255 - cmyk[3] as u16;
    let channel = |c: u8| ((255 - c as u16) * k / 255) as u8;
    [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::{Rational as TiffRational, TiffEncoder, colortype};
    use tiff::tags::ResolutionUnit as TiffResolutionUnit;

    fn encode_pages(pages: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut out).unwrap();
            for &(width, height, dpi) in pages {
                let mut image = encoder.new_image::<colortype::Gray8>(width, height).unwrap();
                image.resolution(TiffResolutionUnit::Inch, TiffRational { n: dpi, d: 1 });
                image.write_data(&vec![128u8; (width * height) as usize]).unwrap();
            }
        }
        out.into_inner()
    }

    #[test]
    fn test_page_count() {
        let data = encode_pages(&[(4, 4, 150), (8, 8, 300), (2, 2, 72)]);
        assert_eq!(StandardTiffReader.page_count(&data).unwrap(), 3);
    }

    #[test]
    fn test_reads_pages_in_order_with_tags() {
        let data = encode_pages(&[(4, 3, 150), (8, 6, 300)]);
        let mut seen = Vec::new();

        StandardTiffReader
            .read_pages(&data, &mut |page| {
                let tags = page.tags?;
                seen.push((page.index, page.image.width(), tags.x_resolution, tags.resolution_unit));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (0, 4, Some(Rational::whole(150)), Some(2)),
                (1, 8, Some(Rational::whole(300)), Some(2)),
            ]
        );
    }

    #[test]
    fn test_rgb_page_decoded() {
        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut out).unwrap();
            encoder
                .write_image::<colortype::RGB8>(2, 1, &[255, 0, 0, 0, 0, 255])
                .unwrap();
        }
        let data = out.into_inner();

        StandardTiffReader
            .read_pages(&data, &mut |page| {
                assert!(matches!(page.image, DynamicImage::ImageRgb8(_)));
                assert_eq!(page.image.to_rgb8().get_pixel(1, 0).0, [0, 0, 255]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = StandardTiffReader.page_count(b"definitely not a tiff");
        assert!(matches!(result, Err(ConversionError::DecodeError(_))));
    }

    #[test]
    fn test_visitor_error_stops_reading() {
        let data = encode_pages(&[(2, 2, 150), (2, 2, 150)]);
        let mut visited = 0;

        let result = StandardTiffReader.read_pages(&data, &mut |_| {
            visited += 1;
            Err(ConversionError::EncodeError("stop".to_string()))
        });

        assert!(matches!(result, Err(ConversionError::EncodeError(_))));
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_unpack_four_bit_rows() {
        // 3 pixels per row pad to 2 bytes
        let packed = [0x12, 0x30, 0xAB, 0xC0];
        let samples = unpack_samples(&packed, 3, 2, 4).unwrap();
        assert_eq!(samples, vec![1, 2, 3, 10, 11, 12]);
    }

    #[test]
    fn test_unpack_one_bit() {
        let samples = unpack_samples(&[0b1010_0000], 3, 1, 1).unwrap();
        assert_eq!(samples, vec![1, 0, 1]);
    }

    #[test]
    fn test_expand_palette() {
        let mut map = vec![0u16; 12];
        map[1] = 0xFF00;
        map[4 + 2] = 0x8000;
        map[8 + 3] = 0x1000;

        let rgb = expand_palette(&[1, 2, 3], &map, 2).unwrap();
        assert_eq!(rgb, vec![0xFF, 0, 0, 0, 0x80, 0, 0, 0, 0x10]);
    }

    #[test]
    fn test_cmyk_conversion() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), [0, 255, 255]);
    }
}
