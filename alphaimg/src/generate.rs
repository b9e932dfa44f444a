//! `generate`: derive a mask PNG from a color PNG.

use alphakit::{ChannelLayout, Limits, PixelBuffer};
use anyhow::Context;

use crate::GenerateArgs;
use crate::codec;
use crate::output::OutputConfig;

/// Run the `generate` subcommand.
pub fn run(args: GenerateArgs, limits: &Limits) -> anyhow::Result<()> {
    let mut source = codec::read_png(&args.input, limits)?;
    if source.layout() == ChannelLayout::Grayscale {
        log::info!(
            "{} is {:?}, expanding to RGB",
            args.input.display(),
            source.layout()
        );
        source = source.to_rgb();
    }

    let output = OutputConfig::new(&args.out, "_alpha").prepare(&[args.input.as_path()])?;

    let mut mask = alphakit::generate(&source, &args.rule)
        .with_context(|| format!("generating mask for {}", args.input.display()))?;
    if args.invert {
        mask = invert(&mask)?;
    }

    codec::write_png(&output, &mask)?;
    eprintln!("{} -> {} ({})", args.input.display(), output.display(), args.rule);
    Ok(())
}

fn invert(mask: &PixelBuffer) -> anyhow::Result<PixelBuffer> {
    let samples = mask.samples().iter().map(|v| 255 - v).collect();
    Ok(PixelBuffer::from_samples(
        mask.width(),
        mask.height(),
        ChannelLayout::Grayscale,
        samples,
    )?)
}
