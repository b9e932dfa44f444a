//! Output path resolution and overwrite checks.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::OutputArgs;

/// Resolved output configuration for one written file.
pub struct OutputConfig {
    pub target_file: Option<PathBuf>,
    pub suffix: String,
    pub force: bool,
}

impl OutputConfig {
    /// Create from CLI args, using `default_suffix` when `--suffix` is absent.
    pub fn new(args: &OutputArgs, default_suffix: &str) -> Self {
        Self {
            target_file: args.output.clone(),
            suffix: args
                .suffix
                .clone()
                .unwrap_or_else(|| default_suffix.to_string()),
            force: args.force,
        }
    }

    /// Resolve the output path for a given input file.
    ///
    /// `-o` wins; otherwise `<stem><suffix>.png` in the input's directory.
    pub fn resolve(&self, input: &Path) -> PathBuf {
        if let Some(ref target) = self.target_file {
            return target.clone();
        }
        let parent = input.parent().unwrap_or(Path::new("."));
        parent.join(self.output_filename(input))
    }

    fn output_filename(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{stem}{}.png", self.suffix)
    }

    /// Refuse to clobber an input or an existing file without `--force`.
    pub fn check_writable(&self, inputs: &[&Path], output: &Path) -> anyhow::Result<()> {
        if let Ok(co) = output.canonicalize() {
            for input in inputs {
                if input.canonicalize().is_ok_and(|ci| ci == co) {
                    bail!("output would overwrite input: {}", input.display());
                }
            }
        }

        if output.exists() && !self.force {
            bail!(
                "output already exists: {}\nUse --force to overwrite",
                output.display()
            );
        }

        Ok(())
    }

    /// Create parent directories for the output path.
    pub fn ensure_parent(output: &Path) -> anyhow::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }

    /// Resolve, check and prepare the output path for the first input.
    pub fn prepare(&self, inputs: &[&Path]) -> anyhow::Result<PathBuf> {
        let primary = inputs
            .first()
            .context("no input to derive an output path from")?;
        let output = self.resolve(primary);
        self.check_writable(inputs, &output)?;
        Self::ensure_parent(&output)?;
        Ok(output)
    }
}
