//! Immutable pixel buffers.
//!
//! Uses `imgref::ImgVec` for 2D pixel data with typed pixels from the `rgb` crate.
//! Buffers are always stored contiguously (stride == width) and expose no
//! mutable access once built, so a buffer can be shared across threads and
//! read by any number of operations at once.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use imgref::{ImgRef, ImgVec};
use rgb::{Gray, Rgb, Rgba};

use crate::{AlphaError, Limits, Result};

/// Channel layout of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChannelLayout {
    /// Red, green, blue, alpha.
    Rgba,
    /// Red, green, blue.
    Rgb,
    /// Single-channel luminance.
    Grayscale,
}

impl ChannelLayout {
    /// Number of interleaved samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Rgba => 4,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Grayscale => 1,
        }
    }

    /// Whether the layout carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, ChannelLayout::Rgba)
    }
}

#[derive(Clone)]
enum Pixels {
    Rgba(ImgVec<Rgba<u8>>),
    Rgb(ImgVec<Rgb<u8>>),
    Gray(ImgVec<Gray<u8>>),
}

/// A rectangular grid of 8-bit samples with a known channel layout.
///
/// Width and height are always non-zero and the sample count always equals
/// `width * height * layout.channels()`. Every operation in this crate takes
/// buffers by reference and returns a newly built one.
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Pixels,
}

impl PixelBuffer {
    /// Build a buffer from flat, row-major, interleaved samples.
    pub fn from_samples(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        samples: Vec<u8>,
    ) -> Result<Self> {
        let (w, h) = checked_dimensions(width, height)?;
        let expected = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(layout.channels()))
            .ok_or(AlphaError::LimitExceeded("sample count overflows usize"))?;
        if samples.len() != expected {
            return Err(AlphaError::InvalidBuffer(format!(
                "{width}x{height} {layout:?} needs {expected} samples, got {}",
                samples.len()
            )));
        }

        let pixels = match layout {
            ChannelLayout::Rgba => Pixels::Rgba(ImgVec::new(
                samples
                    .chunks_exact(4)
                    .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
                    .collect(),
                w,
                h,
            )),
            ChannelLayout::Rgb => Pixels::Rgb(ImgVec::new(
                samples
                    .chunks_exact(3)
                    .map(|p| Rgb::new(p[0], p[1], p[2]))
                    .collect(),
                w,
                h,
            )),
            ChannelLayout::Grayscale => {
                Pixels::Gray(ImgVec::new(samples.into_iter().map(Gray::new).collect(), w, h))
            }
        };
        Ok(Self { pixels })
    }

    /// Wrap an RGBA image. Padded strides are compacted.
    pub fn from_rgba(img: ImgRef<'_, Rgba<u8>>) -> Result<Self> {
        let (buf, w, h) = contiguous(img)?;
        Ok(Self::rgba(buf, w, h))
    }

    /// Wrap an RGB image. Padded strides are compacted.
    pub fn from_rgb(img: ImgRef<'_, Rgb<u8>>) -> Result<Self> {
        let (buf, w, h) = contiguous(img)?;
        Ok(Self::rgb(buf, w, h))
    }

    /// Wrap a grayscale image. Padded strides are compacted.
    pub fn from_gray(img: ImgRef<'_, Gray<u8>>) -> Result<Self> {
        let (buf, w, h) = contiguous(img)?;
        Ok(Self::gray(buf, w, h))
    }

    // Internal constructors. Callers guarantee non-zero dimensions and a
    // buffer of exactly `w * h` pixels, which holds whenever the output
    // mirrors an already valid input.
    pub(crate) fn rgba(buf: Vec<Rgba<u8>>, w: usize, h: usize) -> Self {
        Self {
            pixels: Pixels::Rgba(ImgVec::new(buf, w, h)),
        }
    }

    pub(crate) fn rgb(buf: Vec<Rgb<u8>>, w: usize, h: usize) -> Self {
        Self {
            pixels: Pixels::Rgb(ImgVec::new(buf, w, h)),
        }
    }

    pub(crate) fn gray(buf: Vec<Gray<u8>>, w: usize, h: usize) -> Self {
        Self {
            pixels: Pixels::Gray(ImgVec::new(buf, w, h)),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width_usize() as u32
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height_usize() as u32
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width_usize() * self.height_usize()
    }

    /// Channel layout of the samples.
    pub fn layout(&self) -> ChannelLayout {
        match self.pixels {
            Pixels::Rgba(_) => ChannelLayout::Rgba,
            Pixels::Rgb(_) => ChannelLayout::Rgb,
            Pixels::Gray(_) => ChannelLayout::Grayscale,
        }
    }

    /// Whether the buffer carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.layout().has_alpha()
    }

    /// Flat, row-major, interleaved samples.
    pub fn samples(&self) -> &[u8] {
        match &self.pixels {
            Pixels::Rgba(img) => bytemuck::cast_slice(img.buf().as_slice()),
            Pixels::Rgb(img) => bytemuck::cast_slice(img.buf().as_slice()),
            Pixels::Gray(img) => bytemuck::cast_slice(img.buf().as_slice()),
        }
    }

    /// Borrow as an RGBA image, if that is the layout.
    pub fn as_rgba(&self) -> Option<ImgRef<'_, Rgba<u8>>> {
        match &self.pixels {
            Pixels::Rgba(img) => Some(img.as_ref()),
            _ => None,
        }
    }

    /// Borrow as an RGB image, if that is the layout.
    pub fn as_rgb(&self) -> Option<ImgRef<'_, Rgb<u8>>> {
        match &self.pixels {
            Pixels::Rgb(img) => Some(img.as_ref()),
            _ => None,
        }
    }

    /// Borrow as a grayscale image, if that is the layout.
    pub fn as_gray(&self) -> Option<ImgRef<'_, Gray<u8>>> {
        match &self.pixels {
            Pixels::Gray(img) => Some(img.as_ref()),
            _ => None,
        }
    }

    /// Color channels as RGB: alpha is dropped, gray is replicated.
    pub fn to_rgb(&self) -> PixelBuffer {
        let (w, h) = (self.width_usize(), self.height_usize());
        let buf = match &self.pixels {
            Pixels::Rgba(img) => crate::par::map(img.buf(), |px| Rgb::new(px.r, px.g, px.b)),
            Pixels::Rgb(img) => img.buf().clone(),
            Pixels::Gray(img) => crate::par::map(img.buf(), |g| {
                let v = g.value();
                Rgb::new(v, v, v)
            }),
        };
        Self::rgb(buf, w, h)
    }

    /// Map the RGB part of every pixel, or `None` for grayscale buffers.
    pub(crate) fn map_rgb<D, F>(&self, f: F) -> Option<Vec<D>>
    where
        D: Send,
        F: Fn(Rgb<u8>) -> D + Sync + Send,
    {
        match &self.pixels {
            Pixels::Rgba(img) => Some(crate::par::map(img.buf(), |px| {
                f(Rgb::new(px.r, px.g, px.b))
            })),
            Pixels::Rgb(img) => Some(crate::par::map(img.buf(), |&px| f(px))),
            Pixels::Gray(_) => None,
        }
    }

    /// Like [`map_rgb`](Self::map_rgb), pairing each pixel with the
    /// same-index element of `other` (which must hold one per pixel).
    pub(crate) fn zip_rgb<B, D, F>(&self, other: &[B], f: F) -> Option<Vec<D>>
    where
        B: Sync,
        D: Send,
        F: Fn(Rgb<u8>, &B) -> D + Sync + Send,
    {
        match &self.pixels {
            Pixels::Rgba(img) => Some(crate::par::zip_map(img.buf(), other, |px, o| {
                f(Rgb::new(px.r, px.g, px.b), o)
            })),
            Pixels::Rgb(img) => Some(crate::par::zip_map(img.buf(), other, |&px, o| f(px, o))),
            Pixels::Gray(_) => None,
        }
    }

    /// Reject buffers larger than the given limits.
    pub fn check_limits(&self, limits: &Limits) -> Result<()> {
        limits
            .check_dimensions(u64::from(self.width()), u64::from(self.height()))
            .map_err(AlphaError::LimitExceeded)
    }

    /// Same width and height as `other`.
    pub(crate) fn ensure_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(AlphaError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        Ok(())
    }

    fn width_usize(&self) -> usize {
        match &self.pixels {
            Pixels::Rgba(img) => img.width(),
            Pixels::Rgb(img) => img.width(),
            Pixels::Gray(img) => img.width(),
        }
    }

    fn height_usize(&self) -> usize {
        match &self.pixels {
            Pixels::Rgba(img) => img.height(),
            Pixels::Rgb(img) => img.height(),
            Pixels::Gray(img) => img.height(),
        }
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.layout() == other.layout()
            && self.dimensions() == other.dimensions()
            && self.samples() == other.samples()
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer::{:?}({}x{})",
            self.layout(),
            self.width(),
            self.height()
        )
    }
}

fn checked_dimensions(width: u32, height: u32) -> Result<(usize, usize)> {
    if width == 0 || height == 0 {
        return Err(AlphaError::InvalidBuffer(format!(
            "dimensions must be non-zero, got {width}x{height}"
        )));
    }
    let w = usize::try_from(width).map_err(|_| AlphaError::LimitExceeded("width overflows usize"))?;
    let h =
        usize::try_from(height).map_err(|_| AlphaError::LimitExceeded("height overflows usize"))?;
    Ok((w, h))
}

fn contiguous<T: Copy>(img: ImgRef<'_, T>) -> Result<(Vec<T>, usize, usize)> {
    if img.width() == 0 || img.height() == 0 {
        return Err(AlphaError::InvalidBuffer(format!(
            "dimensions must be non-zero, got {}x{}",
            img.width(),
            img.height()
        )));
    }
    if u32::try_from(img.width()).is_err() || u32::try_from(img.height()).is_err() {
        return Err(AlphaError::LimitExceeded("dimensions exceed u32"));
    }
    let (buf, w, h) = img.to_contiguous_buf();
    Ok((buf.into_owned(), w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn from_samples_rgba() {
        let buf = PixelBuffer::from_samples(2, 1, ChannelLayout::Rgba, vec![1, 2, 3, 4, 5, 6, 7, 8])
            .unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(buf.layout(), ChannelLayout::Rgba);
        assert!(buf.has_alpha());
        assert_eq!(buf.samples(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(buf.as_rgba().unwrap().buf()[1], Rgba::new(5, 6, 7, 8));
    }

    #[test]
    fn from_samples_wrong_length() {
        let err = PixelBuffer::from_samples(2, 2, ChannelLayout::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(err, AlphaError::InvalidBuffer(_)));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let err = PixelBuffer::from_samples(0, 4, ChannelLayout::Grayscale, vec![]).unwrap_err();
        assert!(matches!(err, AlphaError::InvalidBuffer(_)));

        let img: ImgVec<Gray<u8>> = ImgVec::new(vec![], 4, 0);
        assert!(matches!(
            PixelBuffer::from_gray(img.as_ref()),
            Err(AlphaError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn padded_stride_is_compacted() {
        // 2x2 image stored with a stride of 3
        let raw = vec![
            Rgb::new(1, 1, 1),
            Rgb::new(2, 2, 2),
            Rgb::new(99, 99, 99),
            Rgb::new(3, 3, 3),
            Rgb::new(4, 4, 4),
        ];
        let img = ImgRef::new_stride(&raw, 2, 2, 3);
        let buf = PixelBuffer::from_rgb(img).unwrap();
        assert_eq!(buf.samples(), &[1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn to_rgb_drops_alpha_and_expands_gray() {
        let rgba =
            PixelBuffer::from_samples(1, 1, ChannelLayout::Rgba, vec![10, 20, 30, 40]).unwrap();
        assert_eq!(rgba.to_rgb().samples(), &[10, 20, 30]);

        let gray = PixelBuffer::from_samples(2, 1, ChannelLayout::Grayscale, vec![7, 9]).unwrap();
        let rgb = gray.to_rgb();
        assert_eq!(rgb.layout(), ChannelLayout::Rgb);
        assert_eq!(rgb.samples(), &[7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn equality_compares_layout_and_samples() {
        let a = PixelBuffer::from_samples(1, 3, ChannelLayout::Grayscale, vec![1, 2, 3]).unwrap();
        let b = PixelBuffer::from_samples(3, 1, ChannelLayout::Grayscale, vec![1, 2, 3]).unwrap();
        let c = PixelBuffer::from_samples(1, 3, ChannelLayout::Grayscale, vec![1, 2, 3]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn limits_are_enforced() {
        let buf = PixelBuffer::from_samples(4, 4, ChannelLayout::Grayscale, vec![0; 16]).unwrap();
        let limits = Limits {
            max_pixels: Some(10),
            ..Default::default()
        };
        assert_eq!(
            buf.check_limits(&limits),
            Err(AlphaError::LimitExceeded("pixel count exceeds limit"))
        );
        assert!(buf.check_limits(&Limits::none()).is_ok());
    }

    #[test]
    fn debug_format() {
        let buf = PixelBuffer::from_samples(3, 2, ChannelLayout::Rgb, vec![0; 18]).unwrap();
        assert_eq!(alloc::format!("{buf:?}"), "PixelBuffer::Rgb(3x2)");
    }
}
