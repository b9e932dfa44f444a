//! Mask reapplication.

use rgb::{Gray, Rgba};

use crate::{AlphaError, PixelBuffer, Result};

/// Options for [`combine_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombineOptions {
    /// Write `255 - mask` as alpha instead of the mask itself.
    pub invert_mask: bool,
}

impl CombineOptions {
    /// Default options: the mask is copied verbatim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invert the mask while applying it.
    pub fn with_invert_mask(mut self, invert_mask: bool) -> Self {
        self.invert_mask = invert_mask;
        self
    }
}

/// Rebuild an RGBA buffer from a color source and a grayscale mask.
///
/// RGB channels are taken from `color` unchanged. Alpha comes from `mask`
/// at the same coordinate; any alpha already in `color` is replaced, not
/// blended. No resampling happens: mismatched sizes fail with
/// [`AlphaError::DimensionMismatch`].
pub fn combine(color: &PixelBuffer, mask: &PixelBuffer) -> Result<PixelBuffer> {
    combine_with(color, mask, &CombineOptions::default())
}

/// [`combine`] with explicit options.
pub fn combine_with(
    color: &PixelBuffer,
    mask: &PixelBuffer,
    options: &CombineOptions,
) -> Result<PixelBuffer> {
    if !matches!(
        color.layout(),
        crate::ChannelLayout::Rgba | crate::ChannelLayout::Rgb
    ) {
        return Err(AlphaError::unsupported("combine color source", color.layout()));
    }
    let alpha = mask
        .as_gray()
        .ok_or_else(|| AlphaError::unsupported("combine mask", mask.layout()))?;
    color.ensure_same_size(mask)?;

    let invert = options.invert_mask;
    let buf = color
        .zip_rgb(alpha.buf(), |px, gray: &Gray<u8>| {
            let a = gray.value();
            Rgba::new(px.r, px.g, px.b, if invert { 255 - a } else { a })
        })
        .ok_or_else(|| AlphaError::unsupported("combine color source", color.layout()))?;

    log::debug!(
        "combined {}x{} {:?} source with mask (inverted: {invert})",
        color.width(),
        color.height(),
        color.layout()
    );
    Ok(PixelBuffer::rgba(
        buf,
        color.width() as usize,
        color.height() as usize,
    ))
}
