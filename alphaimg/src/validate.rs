//! `validate`: report on the alpha channel of one or many PNG files.

use std::path::Path;

use alphakit::{Limits, Status, ValidationRules};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::ValidateArgs;
use crate::batch::{self, BatchSummary, FileResult};
use crate::codec;

/// Run the `validate` subcommand.
///
/// Fails (non-zero exit) when any file has status FAIL or cannot be read.
pub fn run(args: ValidateArgs, limits: &Limits) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.files)?;
    if files.is_empty() {
        anyhow::bail!("no PNG files found");
    }

    let rules = ValidationRules::default()
        .with_near_constant_tolerance(args.tolerance)
        .with_require_alpha(args.require_alpha);

    let jobs = args.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let summary = if files.len() == 1 {
        BatchSummary {
            results: vec![validate_one(&files[0], &rules, limits)],
        }
    } else {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .context("progress bar template")?
                .progress_chars("=>-"),
        );

        let results = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = validate_one(path, &rules, limits);
                    pb.inc(1);
                    result
                })
                .collect()
        });
        pb.finish_and_clear();
        BatchSummary { results }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_report();
    }

    if let Some(ref csv_path) = args.csv {
        let mut file = std::fs::File::create(csv_path)
            .with_context(|| format!("creating {}", csv_path.display()))?;
        summary.write_csv(&mut file)?;
        eprintln!("CSV report written to {}", csv_path.display());
    }

    let failed = summary.count(Status::Fail);
    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed validation", summary.results.len());
    }
    Ok(())
}

/// Decode and validate a single file, capturing errors in the result.
fn validate_one(path: &Path, rules: &ValidationRules, limits: &Limits) -> FileResult {
    match codec::read_png(path, limits) {
        Ok(buffer) => {
            let report = alphakit::validate_with(&buffer, rules);
            log::info!(
                "{}: {} {}",
                path.display(),
                report.status.as_str(),
                report.classification.as_str()
            );
            FileResult {
                path: path.to_path_buf(),
                report: Some(report),
                error: None,
            }
        }
        Err(err) => {
            log::warn!("{}: {err:#}", path.display());
            FileResult {
                path: path.to_path_buf(),
                report: None,
                error: Some(format!("{err:#}")),
            }
        }
    }
}
