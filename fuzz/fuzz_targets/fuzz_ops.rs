#![no_main]

// Runs every operation on arbitrary buffers. Split followed by combine must
// reproduce the source, and threshold or color-key masks must stay binary.

use alphakit::{
    ChannelLayout, GenerationRule, KeyedAs, PixelBuffer, Rgb, ThresholdMode, ValidationRules,
};
use libfuzzer_sys::{arbitrary, fuzz_target};

#[derive(Debug, arbitrary::Arbitrary)]
enum Layout {
    Rgba,
    Rgb,
    Gray,
}

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    width: u8,
    height: u8,
    layout: Layout,
    cut: u8,
    above_transparent: bool,
    key: [u8; 3],
    tolerance: u8,
    keyed_opaque: bool,
    near_constant_tolerance: u8,
    samples: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let layout = match input.layout {
        Layout::Rgba => ChannelLayout::Rgba,
        Layout::Rgb => ChannelLayout::Rgb,
        Layout::Gray => ChannelLayout::Grayscale,
    };
    let (w, h) = (u32::from(input.width), u32::from(input.height));
    let needed = w as usize * h as usize * layout.channels();
    let mut samples = input.samples;
    samples.resize(needed, 0x5A);

    // Zero-sized buffers must be rejected, never panic.
    let Ok(buffer) = PixelBuffer::from_samples(w, h, layout, samples) else {
        assert!(w == 0 || h == 0);
        return;
    };

    let rules = ValidationRules::default()
        .with_near_constant_tolerance(input.near_constant_tolerance);
    let report = alphakit::validate_with(&buffer, &rules);
    assert_eq!(report.has_alpha(), buffer.has_alpha());

    match alphakit::split(&buffer) {
        Ok(mask) => {
            assert_eq!(alphakit::combine(&buffer, &mask), Ok(buffer.clone()));
        }
        Err(_) => assert!(!buffer.has_alpha()),
    }

    let rules = [
        GenerationRule::Luminance,
        GenerationRule::Threshold {
            cut: input.cut,
            mode: if input.above_transparent {
                ThresholdMode::AboveTransparent
            } else {
                ThresholdMode::AboveOpaque
            },
        },
        GenerationRule::ColorKey {
            key: Rgb::new(input.key[0], input.key[1], input.key[2]),
            tolerance: f32::from(input.tolerance),
            keyed: if input.keyed_opaque {
                KeyedAs::Opaque
            } else {
                KeyedAs::Transparent
            },
        },
    ];
    for rule in &rules {
        match alphakit::generate(&buffer, rule) {
            Ok(mask) => {
                assert_eq!(mask.dimensions(), buffer.dimensions());
                if !matches!(rule, GenerationRule::Luminance) {
                    assert!(mask.samples().iter().all(|&a| a == 0 || a == 255));
                }
                let _ = alphakit::combine(&buffer, &mask);
            }
            Err(_) => assert_eq!(layout, ChannelLayout::Grayscale),
        }
    }
});
