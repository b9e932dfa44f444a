//! PNG decode/encode to and from `PixelBuffer`.
//!
//! Decoding normalizes to 8 bits per sample: palettes are expanded, 16-bit
//! samples keep their high byte, and gray+alpha becomes RGBA.

use std::io::Cursor;
use std::path::Path;

use alphakit::{ChannelLayout, Limits, PixelBuffer};
use anyhow::{Context, anyhow, bail};

/// Decode PNG bytes, rejecting images larger than `limits` before pixels are read.
pub fn decode_png(data: &[u8], limits: &Limits) -> anyhow::Result<PixelBuffer> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder.read_info().context("reading PNG header")?;
    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    limits
        .check_dimensions(u64::from(width), u64::from(height))
        .map_err(|reason| anyhow!("{width}x{height} image rejected: {reason}"))?;

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| anyhow!("cannot determine PNG output buffer size"))?;
    let mut raw = vec![0u8; buffer_size];
    let frame = reader.next_frame(&mut raw).context("decoding PNG data")?;
    raw.truncate(frame.buffer_size());

    let (color_type, depth) = reader.output_color_type();
    if depth != png::BitDepth::Eight {
        bail!("unexpected {depth:?} output after normalization");
    }

    let (layout, samples) = match color_type {
        png::ColorType::Rgba => (ChannelLayout::Rgba, raw),
        png::ColorType::Rgb => (ChannelLayout::Rgb, raw),
        png::ColorType::Grayscale => (ChannelLayout::Grayscale, raw),
        png::ColorType::GrayscaleAlpha => {
            let rgba = raw
                .chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            (ChannelLayout::Rgba, rgba)
        }
        png::ColorType::Indexed => bail!("indexed PNG was not expanded"),
    };

    Ok(PixelBuffer::from_samples(width, height, layout, samples)?)
}

/// Encode a buffer as an 8-bit PNG of matching color type.
pub fn encode_png(buffer: &PixelBuffer) -> anyhow::Result<Vec<u8>> {
    let color = match buffer.layout() {
        ChannelLayout::Rgba => png::ColorType::Rgba,
        ChannelLayout::Rgb => png::ColorType::Rgb,
        ChannelLayout::Grayscale => png::ColorType::Grayscale,
    };

    let mut output = Vec::new();
    let mut encoder = png::Encoder::new(&mut output, buffer.width(), buffer.height());
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("writing PNG header")?;
    writer
        .write_image_data(buffer.samples())
        .context("writing PNG data")?;
    writer.finish().context("finishing PNG stream")?;

    Ok(output)
}

/// Read and decode a PNG file.
pub fn read_png(path: &Path, limits: &Limits) -> anyhow::Result<PixelBuffer> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_png(&data, limits).with_context(|| format!("decoding {}", path.display()))
}

/// Encode and write a PNG file.
pub fn write_png(path: &Path, buffer: &PixelBuffer) -> anyhow::Result<()> {
    let data = encode_png(buffer)?;
    std::fs::write(path, &data).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "wrote {} ({}x{} {:?}, {} bytes)",
        path.display(),
        buffer.width(),
        buffer.height(),
        buffer.layout(),
        data.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(layout: ChannelLayout, samples: Vec<u8>) {
        let buffer = PixelBuffer::from_samples(2, 2, layout, samples).unwrap();
        let png = encode_png(&buffer).unwrap();
        let decoded = decode_png(&png, &Limits::none()).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn round_trip_each_layout() {
        round_trip(ChannelLayout::Rgba, (0..16).collect());
        round_trip(ChannelLayout::Rgb, (100..112).collect());
        round_trip(ChannelLayout::Grayscale, vec![0, 85, 170, 255]);
    }

    fn encode_raw(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        palette: Option<Vec<u8>>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut output = Vec::new();
        let mut encoder = png::Encoder::new(&mut output, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(palette) = palette {
            encoder.set_palette(palette);
        }
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
        output
    }

    #[test]
    fn gray_alpha_becomes_rgba() {
        let png = encode_raw(
            2,
            1,
            png::ColorType::GrayscaleAlpha,
            png::BitDepth::Eight,
            None,
            &[10, 0, 200, 255],
        );
        let decoded = decode_png(&png, &Limits::none()).unwrap();
        assert_eq!(decoded.layout(), ChannelLayout::Rgba);
        assert_eq!(decoded.samples(), &[10, 10, 10, 0, 200, 200, 200, 255]);
    }

    #[test]
    fn sixteen_bit_keeps_high_byte() {
        let png = encode_raw(
            2,
            1,
            png::ColorType::Grayscale,
            png::BitDepth::Sixteen,
            None,
            &[0xAB, 0xCD, 0x01, 0xFF],
        );
        let decoded = decode_png(&png, &Limits::none()).unwrap();
        assert_eq!(decoded.layout(), ChannelLayout::Grayscale);
        assert_eq!(decoded.samples(), &[0xAB, 0x01]);
    }

    #[test]
    fn palette_is_expanded() {
        let png = encode_raw(
            2,
            1,
            png::ColorType::Indexed,
            png::BitDepth::Eight,
            Some(vec![255, 0, 0, 0, 0, 255]),
            &[1, 0],
        );
        let decoded = decode_png(&png, &Limits::none()).unwrap();
        assert_eq!(decoded.layout(), ChannelLayout::Rgb);
        assert_eq!(decoded.samples(), &[0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn limits_reject_before_decoding() {
        let buffer = PixelBuffer::from_samples(4, 4, ChannelLayout::Grayscale, vec![0; 16])
            .unwrap();
        let png = encode_png(&buffer).unwrap();
        let err = decode_png(&png, &Limits::none().with_max_pixels(15)).unwrap_err();
        assert!(err.to_string().contains("pixel count exceeds limit"));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_png(b"not a png", &Limits::none()).is_err());
    }
}
