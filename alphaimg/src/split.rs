//! `split`: write an RGBA image's alpha channel as a grayscale PNG.

use alphakit::Limits;
use anyhow::{Context, bail};

use crate::SplitArgs;
use crate::codec;
use crate::output::OutputConfig;

/// Run the `split` subcommand.
///
/// Every output path is checked before anything is written, so a refused
/// `--rgb-out` leaves no mask behind.
pub fn run(args: SplitArgs, limits: &Limits) -> anyhow::Result<()> {
    let source = codec::read_png(&args.input, limits)?;
    let output = OutputConfig::new(&args.out, "_alpha").prepare(&[args.input.as_path()])?;

    let rgb_output = match args.rgb_out {
        Some(ref rgb_out) => {
            let rgb_config = OutputConfig {
                target_file: Some(rgb_out.clone()),
                suffix: String::new(),
                force: args.out.force,
            };
            let rgb_output = rgb_config.prepare(&[args.input.as_path()])?;
            if rgb_output == output {
                bail!(
                    "--rgb-out and the mask output are the same file: {}",
                    output.display()
                );
            }
            Some(rgb_output)
        }
        None => None,
    };

    let (color, mask) = alphakit::split_channels(&source)
        .with_context(|| format!("splitting {}", args.input.display()))?;

    codec::write_png(&output, &mask)?;
    eprintln!("{} -> {}", args.input.display(), output.display());

    if let Some(rgb_output) = rgb_output {
        codec::write_png(&rgb_output, &color)?;
        eprintln!("{} -> {}", args.input.display(), rgb_output.display());
    }

    Ok(())
}
