//! Channel primitives: alpha access, alpha-plane replacement, luminance.

use alloc::vec::Vec;

use rgb::{Gray, Rgb, Rgba};

use crate::{AlphaError, PixelBuffer, Result};

/// Perceptual luma of an sRGB-style color.
///
/// `round(0.299 r + 0.587 g + 0.114 b)`, computed in integer arithmetic so
/// that exact halves always round up and output is reproducible everywhere.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    // max is (255_000 + 500) / 1000 = 255
    ((weighted + 500) / 1000).min(255) as u8
}

#[inline]
pub(crate) fn luminance_of(px: Rgb<u8>) -> u8 {
    luminance(px.r, px.g, px.b)
}

/// Alpha sample at `(x, y)`.
///
/// Fails with [`AlphaError::OutOfBounds`] outside the buffer and with
/// [`AlphaError::UnsupportedLayout`] when the buffer has no alpha channel.
pub fn read_alpha(buffer: &PixelBuffer, x: u32, y: u32) -> Result<u8> {
    let (width, height) = buffer.dimensions();
    if x >= width || y >= height {
        return Err(AlphaError::OutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    let img = buffer
        .as_rgba()
        .ok_or_else(|| AlphaError::unsupported("read_alpha", buffer.layout()))?;
    Ok(img[(x as usize, y as usize)].a)
}

/// The alpha plane, one sample per pixel in row-major order.
pub fn alpha_plane(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let img = buffer
        .as_rgba()
        .ok_or_else(|| AlphaError::unsupported("alpha_plane", buffer.layout()))?;
    Ok(crate::par::map(img.buf(), |px| px.a))
}

/// A new RGBA buffer with `color`'s RGB channels and the given alpha plane.
///
/// Any alpha already present in `color` is discarded. `alpha` must hold one
/// sample per pixel.
pub fn with_alpha(color: &PixelBuffer, alpha: &[u8]) -> Result<PixelBuffer> {
    if alpha.len() != color.pixel_count() {
        return Err(AlphaError::InvalidBuffer(alloc::format!(
            "alpha plane has {} samples, buffer has {} pixels",
            alpha.len(),
            color.pixel_count()
        )));
    }
    let buf = color
        .zip_rgb(alpha, |px, &a| Rgba::new(px.r, px.g, px.b, a))
        .ok_or_else(|| AlphaError::unsupported("with_alpha", color.layout()))?;
    Ok(PixelBuffer::rgba(
        buf,
        color.width() as usize,
        color.height() as usize,
    ))
}

/// Single-channel luminance of any buffer.
///
/// Color buffers are reduced with [`luminance`] (alpha is ignored);
/// grayscale buffers are copied as-is.
pub fn grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    match buffer.map_rgb(|px| Gray::new(luminance_of(px))) {
        Some(buf) => PixelBuffer::gray(buf, buffer.width() as usize, buffer.height() as usize),
        None => buffer.clone(),
    }
}
