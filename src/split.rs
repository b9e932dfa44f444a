//! Alpha channel extraction.

use rgb::Gray;

use crate::{AlphaError, PixelBuffer, Result};

/// Extract the alpha channel of an RGBA buffer as a grayscale mask.
///
/// Inputs without alpha fail with [`AlphaError::UnsupportedLayout`]; no
/// opaque mask is synthesized. Use [`validate`](crate::validate) first to
/// detect that case.
pub fn split(source: &PixelBuffer) -> Result<PixelBuffer> {
    let img = source
        .as_rgba()
        .ok_or_else(|| AlphaError::unsupported("split", source.layout()))?;
    let mask = crate::par::map(img.buf(), |px| Gray::new(px.a));
    log::debug!("split {}x{} alpha into mask", source.width(), source.height());
    Ok(PixelBuffer::gray(mask, img.width(), img.height()))
}

/// Split an RGBA buffer into its RGB color part and its alpha mask.
pub fn split_channels(source: &PixelBuffer) -> Result<(PixelBuffer, PixelBuffer)> {
    let mask = split(source)?;
    Ok((source.to_rgb(), mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelLayout;
    use alloc::vec;

    #[test]
    fn split_extracts_alpha() {
        let src = PixelBuffer::from_samples(
            2,
            2,
            ChannelLayout::Rgba,
            vec![
                1, 2, 3, 255, //
                4, 5, 6, 0, //
                7, 8, 9, 255, //
                10, 11, 12, 0,
            ],
        )
        .unwrap();
        let mask = split(&src).unwrap();
        assert_eq!(mask.layout(), ChannelLayout::Grayscale);
        assert_eq!(mask.dimensions(), (2, 2));
        assert_eq!(mask.samples(), &[255, 0, 255, 0]);
    }

    #[test]
    fn split_rejects_missing_alpha() {
        let rgb = PixelBuffer::from_samples(1, 1, ChannelLayout::Rgb, vec![0, 0, 0]).unwrap();
        assert_eq!(
            split(&rgb),
            Err(AlphaError::UnsupportedLayout {
                operation: "split",
                layout: ChannelLayout::Rgb
            })
        );
        let gray = PixelBuffer::from_samples(1, 1, ChannelLayout::Grayscale, vec![0]).unwrap();
        assert!(split(&gray).is_err());
    }

    #[test]
    fn split_channels_returns_color_and_mask() {
        let src =
            PixelBuffer::from_samples(2, 1, ChannelLayout::Rgba, vec![1, 2, 3, 40, 5, 6, 7, 80])
                .unwrap();
        let (rgb, mask) = split_channels(&src).unwrap();
        assert_eq!(rgb.layout(), ChannelLayout::Rgb);
        assert_eq!(rgb.samples(), &[1, 2, 3, 5, 6, 7]);
        assert_eq!(mask.samples(), &[40, 80]);
    }

    #[test]
    fn split_leaves_source_untouched() {
        let src =
            PixelBuffer::from_samples(1, 1, ChannelLayout::Rgba, vec![9, 9, 9, 9]).unwrap();
        let before = src.clone();
        let _ = split(&src).unwrap();
        assert_eq!(src, before);
    }
}
