use image::{Rgb, RgbImage};
use log::debug;

use super::iterators::{ColorIter, ColorIterMut, Region, RegionMut, COLOR_CHANNELS};
use crate::error::AuroraError;
use crate::result::Result;

/// writes one bit into the least significant bit of a color channel
pub trait HideBit {
    fn hide_bit(self, bit: bool);
}

impl HideBit for &mut u8 {
    #[inline(always)]
    fn hide_bit(self, bit: bool) {
        *self = (*self & (u8::MAX - 1)) | u8::from(bit);
    }
}

/// Fails with `CapacityExceeded` if `needed` bits do not fit into `available` bits
pub fn check_capacity(needed: usize, available: usize) -> Result<()> {
    if needed > available {
        return Err(AuroraError::CapacityExceeded { needed, available });
    }

    Ok(())
}

/// The top left pixel area of an image that carries the envelope.
///
/// The region is `min(region_size, width) x min(region_size, height)`, so it never
/// exceeds the image. Every pixel contributes one bit per R, G and B channel,
/// visited row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbRegion {
    width: u32,
    height: u32,
}

impl LsbRegion {
    /// a `width x height` region, clamped to the image on every embed and extract
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// computes the region of `image`, bounded by `region_size` and the image dimensions
    pub fn for_image(image: &RgbImage, region_size: u32) -> Self {
        let (width, height) = image.dimensions();

        Self::new(region_size.min(width), region_size.min(height))
    }

    fn within(&self, image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();

        Self::new(self.width.min(width), self.height.min(height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn capacity_bits(&self) -> usize {
        self.width as usize * self.height as usize * COLOR_CHANNELS
    }

    /// zeros the least significant bit of every color channel in the region
    pub fn clear(&self, image: &mut RgbImage) {
        for c in self.within(image).colors_mut(image) {
            c.hide_bit(false);
        }
    }

    /// Clears the whole region and then writes `bits` into it.
    ///
    /// The capacity is checked before any pixel is touched, so a failing call
    /// leaves `image` unchanged. Channels after the last bit keep a cleared LSB,
    /// which wipes any residue of a previously longer payload.
    pub fn embed(&self, image: &mut RgbImage, bits: &[bool]) -> Result<()> {
        let region = self.within(image);
        check_capacity(bits.len(), region.capacity_bits())?;

        region.clear(image);
        for (c, bit) in region.colors_mut(image).zip(bits.iter()) {
            c.hide_bit(*bit);
        }
        debug!(
            "embedded {} bits into a {}x{} region",
            bits.len(),
            region.width,
            region.height
        );

        Ok(())
    }

    /// reads the least significant bit of every color channel in the region
    pub fn extract(&self, image: &RgbImage) -> Vec<bool> {
        let region = self.within(image);
        let mut bits = Vec::with_capacity(region.capacity_bits());
        bits.extend(
            ColorIter::from_region(Region::from_rows(image.rows(), region.width, region.height))
                .map(|c| c & 1 == 1),
        );

        bits
    }

    fn colors_mut<'i>(&self, image: &'i mut RgbImage) -> ColorIterMut<'i, Rgb<u8>> {
        ColorIterMut::from_region(RegionMut::from_rows_mut(
            image.rows_mut(),
            self.width,
            self.height,
        ))
    }
}
