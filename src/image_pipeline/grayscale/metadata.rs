//! Per-page resolution and timestamp handling.
//!
//! Source tags are read into [`PageTags`] by the reader, turned into a
//! [`PageMetadata`] record (or the default record when they cannot be
//! interpreted), normalized to inches and finally rescaled to the target DPI.

use chrono::Local;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Resolution assumed when a page carries none.
pub const DEFAULT_DPI: u32 = 150;

/// Multiplier applied to centimeter resolutions to express them per inch.
pub const CENTIMETER_SCALE: f64 = 2.571428571;

/// Largest page, in pixels, a rescale may produce.
pub const MAX_SCALED_PIXELS: u64 = 1 << 28;

/// `DateTime` tag layout, `yyyy:MM:dd HH:mm:ss`.
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub const fn whole(value: u32) -> Self {
        Self::new(value, 1)
    }

    pub fn value(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    fn rounded(&self) -> Self {
        Self::whole(round_to_u32(self.value()))
    }

    fn centimeters_to_inches(&self) -> Self {
        Self::whole(round_to_u32(
            self.numerator as f64 * (CENTIMETER_SCALE / self.denominator as f64),
        ))
    }
}

impl From<Rational> for tiff::encoder::Rational {
    fn from(value: Rational) -> Self {
        tiff::encoder::Rational {
            n: value.numerator,
            d: value.denominator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionUnit {
    None,
    Inch,
    Centimeter,
}

impl ResolutionUnit {
    pub fn from_tag(code: u16) -> Result<Self> {
        match code {
            1 => Ok(Self::None),
            2 => Ok(Self::Inch),
            3 => Ok(Self::Centimeter),
            other => Err(ConversionError::MetadataParseError(format!(
                "unknown resolution unit {other}"
            ))),
        }
    }
}

/// Raw tag values as found in a source IFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTags {
    pub resolution_unit: Option<u16>,
    pub x_resolution: Option<Rational>,
    pub y_resolution: Option<Rational>,
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub resolution_unit: ResolutionUnit,
    pub x_resolution: Rational,
    pub y_resolution: Rational,
    pub timestamp: String,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            resolution_unit: ResolutionUnit::Inch,
            x_resolution: Rational::whole(DEFAULT_DPI),
            y_resolution: Rational::whole(DEFAULT_DPI),
            timestamp: current_timestamp(),
        }
    }
}

impl PageMetadata {
    /// Builds the record for a page from its tags.
    ///
    /// Resolutions are only taken from the page when both axes are present,
    /// and are normalized to inches in that case. A missing `DateTime` keeps
    /// the current time.
    pub fn from_tags(tags: &PageTags) -> Result<Self> {
        let mut metadata = Self::default();

        if let Some(code) = tags.resolution_unit {
            metadata.resolution_unit = ResolutionUnit::from_tag(code)?;
        }

        if let Some(timestamp) = &tags.date_time {
            metadata.timestamp = timestamp.trim_end_matches('\0').to_string();
        }

        if let (Some(x), Some(y)) = (tags.x_resolution, tags.y_resolution) {
            for (axis, value) in [("x", x), ("y", y)] {
                if value.numerator == 0 || value.denominator == 0 {
                    return Err(ConversionError::MetadataParseError(format!(
                        "{axis} resolution {}/{} is not usable",
                        value.numerator, value.denominator
                    )));
                }
            }
            metadata.x_resolution = x;
            metadata.y_resolution = y;
            metadata.normalize_units();

            let normalized = [metadata.x_resolution, metadata.y_resolution];
            for ((axis, value), normalized) in [("x", x), ("y", y)].into_iter().zip(normalized) {
                if normalized.numerator == 0 {
                    return Err(ConversionError::MetadataParseError(format!(
                        "{axis} resolution {}/{} rounds to zero",
                        value.numerator, value.denominator
                    )));
                }
            }
        }

        Ok(metadata)
    }

    /// Expresses centimeter resolutions in inches and collapses inch
    /// fractions to whole numbers. Units other than these two are left alone.
    pub fn normalize_units(&mut self) {
        match self.resolution_unit {
            ResolutionUnit::Centimeter => {
                self.x_resolution = self.x_resolution.centimeters_to_inches();
                self.y_resolution = self.y_resolution.centimeters_to_inches();
                self.resolution_unit = ResolutionUnit::Inch;
            }
            ResolutionUnit::Inch
                if self.x_resolution.denominator > 1 || self.y_resolution.denominator > 1 =>
            {
                self.x_resolution = self.x_resolution.rounded();
                self.y_resolution = self.y_resolution.rounded();
            }
            _ => {}
        }
    }

    /// Factor to bring the horizontal resolution to `target_dpi`, or `None`
    /// when the page is already there.
    pub fn scale_factor(&self, target_dpi: u32) -> Option<f64> {
        let x = self.x_resolution.value();
        if x == target_dpi as f64 {
            None
        } else {
            Some(target_dpi as f64 / x)
        }
    }

    /// Records a rescale by `factor`: X becomes the target, Y follows the
    /// same factor so the two axes stay proportionate.
    pub fn apply_scale(&mut self, target_dpi: u32, factor: f64) {
        self.y_resolution = Rational::whole(round_to_u32(self.y_resolution.value() * factor));
        self.x_resolution = Rational::whole(target_dpi);
    }
}

/// Output dimensions for a page scaled horizontally by `factor`, keeping the
/// aspect ratio. Fails when the result would exceed [`MAX_SCALED_PIXELS`].
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32)> {
    let new_width = (width as f64 * factor).round().max(1.0);
    let new_height = (height as f64 * new_width / width as f64).round().max(1.0);

    let pixels = new_width * new_height;
    if !pixels.is_finite() || pixels > MAX_SCALED_PIXELS as f64 {
        return Err(ConversionError::InvalidDimensions(
            round_to_u32(new_width),
            round_to_u32(new_height),
        ));
    }
    Ok((new_width as u32, new_height as u32))
}

pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn round_to_u32(value: f64) -> u32 {
    value.round().clamp(0.0, u32::MAX as f64) as u32
}
