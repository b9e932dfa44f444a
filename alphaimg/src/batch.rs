//! Input expansion and the per-file validation summary.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use alphakit::{Status, ValidationReport};
use serde::Serialize;

/// Expand input patterns into a deduplicated list of PNG files.
///
/// Handles:
/// - Glob patterns (containing `*`, `?`, `[`)
/// - Plain file paths (taken as given, whatever the extension)
/// - Directories (recursive `.png` discovery, sorted by path)
///
/// Order follows the patterns; duplicates are dropped by canonical path.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() && is_png(&path) {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                let mut found = Vec::new();
                for_each_png_in_dir(&path, &mut found);
                found.sort();
                for path in found {
                    push_unique(path, &mut seen, &mut files);
                }
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    Ok(files)
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

/// Check if a file path has a `.png` extension (any case).
pub fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Recursively find PNG files in a directory.
fn for_each_png_in_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            log::warn!("skipping {}: {err}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            for_each_png_in_dir(&path, files);
        } else if path.is_file() && is_png(&path) {
            files.push(path);
        }
    }
}

/// Outcome of validating a single file.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    /// Status of the file; unreadable files count as failures.
    pub fn status(&self) -> Status {
        match &self.report {
            Some(report) => report.status,
            None => Status::Fail,
        }
    }
}

/// Accumulated results of a `validate` run, in input order.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BatchSummary {
    pub results: Vec<FileResult>,
}

impl BatchSummary {
    pub fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    /// Print one block per file plus a totals line.
    pub fn print_report(&self) {
        for r in &self.results {
            match (&r.report, &r.error) {
                (Some(report), _) => {
                    println!(
                        "{}: {} ({}, {}x{})",
                        r.path.display(),
                        report.status.as_str(),
                        report.classification.as_str(),
                        report.width,
                        report.height
                    );
                    if report.has_alpha() {
                        println!(
                            "  alpha min {} max {} mean {:.2} std {:.2} | transparent {:.2}% opaque {:.2}% partial {:.2}%",
                            report.min,
                            report.max,
                            report.mean,
                            report.std_dev,
                            report.fraction_transparent * 100.0,
                            report.fraction_opaque * 100.0,
                            report.fraction_partial * 100.0,
                        );
                    }
                    for message in report.messages() {
                        println!("  {message}");
                    }
                }
                (None, Some(err)) => println!("{}: FAIL ({err})", r.path.display()),
                (None, None) => {}
            }
        }

        if self.results.len() > 1 {
            println!(
                "{} files: {} pass, {} warn, {} fail ({} unreadable)",
                self.results.len(),
                self.count(Status::Pass),
                self.count(Status::Warn),
                self.count(Status::Fail),
                self.error_count(),
            );
        }
    }

    /// Write results as CSV.
    pub fn write_csv(&self, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(
            out,
            "path,status,classification,width,height,min,max,mean,std_dev,\
             fraction_transparent,fraction_opaque,fraction_partial,fraction_near_constant,error"
        )?;
        for r in &self.results {
            let path = csv_field(&r.path.display().to_string());
            match &r.report {
                Some(report) => writeln!(
                    out,
                    "{path},{},{},{},{},{},{},{:.4},{:.4},{:.6},{:.6},{:.6},{:.6},",
                    report.status.as_str(),
                    report.classification.as_str(),
                    report.width,
                    report.height,
                    report.min,
                    report.max,
                    report.mean,
                    report.std_dev,
                    report.fraction_transparent,
                    report.fraction_opaque,
                    report.fraction_partial,
                    report.fraction_near_constant,
                )?,
                None => writeln!(
                    out,
                    "{path},FAIL,,,,,,,,,,,,{}",
                    csv_field(r.error.as_deref().unwrap_or_default())
                )?,
            }
        }
        Ok(())
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphakit::{ChannelLayout, PixelBuffer};

    fn report(alpha: &[u8]) -> ValidationReport {
        let samples = alpha.iter().flat_map(|&a| [0, 0, 0, a]).collect();
        let buffer =
            PixelBuffer::from_samples(alpha.len() as u32, 1, ChannelLayout::Rgba, samples)
                .unwrap();
        alphakit::validate(&buffer)
    }

    #[test]
    fn expands_dirs_globs_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        for name in ["b.png", "a.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(sub.join("c.png"), b"x").unwrap();

        let root = dir.path().to_str().unwrap().to_string();
        let files = expand_inputs(&[
            format!("{root}/b.png"),
            root.clone(),
            format!("{root}/*.png"),
        ])
        .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["b.png", "a.PNG", "c.png"]);
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(expand_inputs(&["/definitely/not/here.png".to_string()]).is_err());
    }

    #[test]
    fn unreadable_files_fail() {
        let summary = BatchSummary {
            results: vec![
                FileResult {
                    path: "ok.png".into(),
                    report: Some(report(&[0, 255])),
                    error: None,
                },
                FileResult {
                    path: "flat.png".into(),
                    report: Some(report(&[255, 255])),
                    error: None,
                },
                FileResult {
                    path: "bad.png".into(),
                    report: None,
                    error: Some("decoding bad.png".into()),
                },
            ],
        };
        assert_eq!(summary.count(Status::Pass), 1);
        assert_eq!(summary.count(Status::Warn), 1);
        assert_eq!(summary.count(Status::Fail), 1);
        assert_eq!(summary.error_count(), 1);
    }

    #[test]
    fn csv_rows() {
        let summary = BatchSummary {
            results: vec![
                FileResult {
                    path: "a,b.png".into(),
                    report: Some(report(&[0, 255])),
                    error: None,
                },
                FileResult {
                    path: "c.png".into(),
                    report: None,
                    error: Some("bad \"header\"".into()),
                },
            ],
        };
        let mut out = Vec::new();
        summary.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("path,status,classification,"));
        assert_eq!(lines[0].split(',').count(), 14);
        assert_eq!(
            lines[1],
            "\"a,b.png\",PASS,binary,2,1,0,255,127.5000,127.5000,0.500000,0.500000,0.000000,0.500000,"
        );
        assert_eq!(lines[2], "c.png,FAIL,,,,,,,,,,,,\"bad \"\"header\"\"\"");
    }
}
