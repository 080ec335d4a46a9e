//! Linear grayscale palette.

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Largest palette a 4-bit index can address.
pub const MAX_GRAY_LEVELS: u8 = 16;

/// Bits used per output pixel index.
pub const INDEX_BITS: u16 = 4;

/// Ordered, immutable gray ramp shared by every page of a run.
///
/// Entry `i` holds `min(i * levels, 255)` and is used for the red, green and
/// blue channel alike. A 256-entry lookup maps any 8-bit luma value to the
/// nearest entry.
#[derive(Debug, Clone)]
pub struct GrayscalePalette {
    entries: Vec<u8>,
    nearest: [u8; 256],
}

impl GrayscalePalette {
    pub fn new(levels: u8) -> Result<Self> {
        if levels == 0 || levels > MAX_GRAY_LEVELS {
            return Err(ConversionError::InvalidGrayLevels(levels));
        }

        let step = levels as u32;
        let entries: Vec<u8> = (0..step).map(|i| (i * step).min(255) as u8).collect();

        let mut nearest = [0u8; 256];
        for (value, slot) in nearest.iter_mut().enumerate() {
            *slot = nearest_entry(&entries, value as u8);
        }

        Ok(Self { entries, nearest })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[u8] {
        &self.entries
    }

    /// Palette index closest to an 8-bit gray value.
    #[inline]
    pub fn index_of(&self, luma: u8) -> u8 {
        self.nearest[luma as usize]
    }

    /// TIFF `ColorMap` for a 4-bit palette: 16 reds, 16 greens, 16 blues,
    /// each scaled to 16 bits. Unused slots stay black.
    pub fn color_map(&self) -> Vec<u16> {
        let slots = 1usize << INDEX_BITS;
        let mut channel = vec![0u16; slots];
        for (slot, &entry) in channel.iter_mut().zip(&self.entries) {
            *slot = entry as u16 * 257;
        }
        channel.repeat(3)
    }
}

// Ties resolve to the lower index.
fn nearest_entry(entries: &[u8], value: u8) -> u8 {
    let mut best = 0usize;
    let mut best_distance = u8::MAX as i16 + 1;
    for (i, &entry) in entries.iter().enumerate() {
        let distance = (entry as i16 - value as i16).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best as u8
}
