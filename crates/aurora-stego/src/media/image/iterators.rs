use image::buffer::{Pixels, PixelsMut, Rows, RowsMut};
use image::Pixel;
use std::iter::Take;
use std::slice::{Iter, IterMut};

/// Only R, G and B carry data, alpha (if any) is never touched
pub(crate) const COLOR_CHANNELS: usize = 3;

/// Row-major mutable access to the pixels of the top left `width` x `height` region
pub(crate) struct RegionMut<'a, P: Pixel + 'a> {
    width: usize,
    rows_mut: Take<RowsMut<'a, P>>,
    row: Option<Take<PixelsMut<'a, P>>>,
}

impl<'a, P: Pixel + 'a> RegionMut<'a, P> {
    pub fn from_rows_mut(rows_mut: RowsMut<'a, P>, width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            rows_mut: rows_mut.take(height as usize),
            row: None,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for RegionMut<'a, P> {
    type Item = &'a mut P;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(p) = self.row.as_mut().and_then(|row| row.next()) {
                return Some(p);
            }
            self.row = Some(self.rows_mut.next()?.take(self.width));
        }
    }
}

/// Row-major readonly access to the pixels of the top left `width` x `height` region
pub(crate) struct Region<'a, P: Pixel + 'a> {
    width: usize,
    rows: Take<Rows<'a, P>>,
    row: Option<Take<Pixels<'a, P>>>,
}

impl<'a, P: Pixel + 'a> Region<'a, P> {
    pub fn from_rows(rows: Rows<'a, P>, width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            rows: rows.take(height as usize),
            row: None,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for Region<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(p) = self.row.as_mut().and_then(|row| row.next()) {
                return Some(p);
            }
            self.row = Some(self.rows.next()?.take(self.width));
        }
    }
}

/// yields the R, G, B channels of every region pixel in turn
pub(crate) struct ColorIterMut<'a, P: Pixel + 'a> {
    pixel: RegionMut<'a, P>,
    colors: Option<Take<IterMut<'a, P::Subpixel>>>,
}

impl<'a, P: Pixel + 'a> ColorIterMut<'a, P> {
    pub fn from_region(region: RegionMut<'a, P>) -> Self {
        Self {
            pixel: region,
            colors: None,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for ColorIterMut<'a, P> {
    type Item = &'a mut P::Subpixel;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(c) = self.colors.as_mut().and_then(|colors| colors.next()) {
                return Some(c);
            }
            let p = self.pixel.next()?;
            self.colors = Some(p.channels_mut().iter_mut().take(COLOR_CHANNELS));
        }
    }
}

pub(crate) struct ColorIter<'a, P: Pixel + 'a> {
    pixel: Region<'a, P>,
    colors: Option<Take<Iter<'a, P::Subpixel>>>,
}

impl<'a, P: Pixel + 'a> ColorIter<'a, P> {
    pub fn from_region(region: Region<'a, P>) -> Self {
        Self {
            pixel: region,
            colors: None,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for ColorIter<'a, P> {
    type Item = &'a P::Subpixel;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(c) = self.colors.as_mut().and_then(|colors| colors.next()) {
                return Some(c);
            }
            let p = self.pixel.next()?;
            self.colors = Some(p.channels().iter().take(COLOR_CHANNELS));
        }
    }
}
