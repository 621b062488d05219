//! denoise.toml job manifest
//!
//! ```toml
//! [[job]]
//! input = "scan.vcache"
//! output = "clean.vcache"
//! algorithm = "bilateral"
//! range = [1, 120]
//! preset = "medium"
//! sigma_spatial = 0.1
//!
//! [[job]]
//! input = "takes/walk"
//! output = "takes/walk_smooth"
//! algorithm = "temporal"
//! window = 7
//! weight = "gaussian"
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::args::{BilateralArgs, RangeArgs, TemporalArgs};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "denoise.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Temporal,
    Bilateral,
}

impl Algorithm {
    /// Companion executable that runs this algorithm
    pub fn executable(self) -> &'static str {
        match self {
            Algorithm::Temporal => "temporal-mesh-denoiser",
            Algorithm::Bilateral => "bilateral-mesh-denoiser",
        }
    }
}

/// denoise.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct DenoiseManifest {
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobEntry>,
}

/// Single `[[job]]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub algorithm: Algorithm,

    /// `[start, end]`, 1-based and inclusive
    #[serde(default)]
    pub range: Option<[u32; 2]>,
    #[serde(default)]
    pub start_frame: Option<u32>,
    #[serde(default)]
    pub end_frame: Option<u32>,

    #[serde(default)]
    pub window: Option<usize>,

    // Temporal only
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub sigma: Option<f32>,

    // Bilateral only
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub sigma_temporal: Option<f32>,
    #[serde(default)]
    pub sigma_spatial: Option<f32>,
    #[serde(default)]
    pub motion_thresh: Option<f32>,
    #[serde(default)]
    pub edge_thresh: Option<f32>,

    #[serde(default = "default_passes")]
    pub passes: usize,
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_passes() -> usize {
    1
}

/// A validated job rendered as a command line for its executable
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedJob {
    /// 1-based position in the manifest
    pub index: usize,
    pub algorithm: Algorithm,
    pub input: PathBuf,
    pub output: PathBuf,
    pub args: Vec<String>,
}

impl DenoiseManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse denoise.toml")
    }

    /// Validate every job and build its argv, resolving paths against `base_dir`
    pub fn plan(&self, base_dir: &Path) -> Result<Vec<PlannedJob>> {
        if self.jobs.is_empty() {
            anyhow::bail!("Manifest contains no [[job]] entries");
        }
        self.jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                job.plan(i + 1, base_dir)
                    .with_context(|| format!("Job {} ({})", i + 1, job.input.display()))
            })
            .collect()
    }
}

impl JobEntry {
    fn range_args(&self) -> Result<RangeArgs> {
        if self.range.is_some() && (self.start_frame.is_some() || self.end_frame.is_some()) {
            anyhow::bail!("'range' cannot be combined with 'start_frame' or 'end_frame'");
        }
        let range = RangeArgs {
            maya_range: self.range.map(|r| r.to_vec()),
            start_frame: self.start_frame,
            end_frame: self.end_frame,
        };
        range.validate()?;
        Ok(range)
    }

    fn reject_fields(&self, fields: &[(&str, bool)]) -> Result<()> {
        let set: Vec<&str> = fields
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| *name)
            .collect();
        if !set.is_empty() {
            anyhow::bail!(
                "{} not supported by the {} algorithm",
                set.join(", "),
                self.algorithm.executable()
            );
        }
        Ok(())
    }

    fn filter_args(&self) -> Result<Vec<String>> {
        match self.algorithm {
            Algorithm::Temporal => {
                self.reject_fields(&[
                    ("preset", self.preset.is_some()),
                    ("sigma_temporal", self.sigma_temporal.is_some()),
                    ("sigma_spatial", self.sigma_spatial.is_some()),
                    ("motion_thresh", self.motion_thresh.is_some()),
                    ("edge_thresh", self.edge_thresh.is_some()),
                ])?;
                let args = TemporalArgs {
                    window: self.window,
                    weight: self.weight.as_deref().map(str::parse).transpose()?,
                    sigma: self.sigma,
                };
                args.params()?;
                Ok(args.to_args())
            }
            Algorithm::Bilateral => {
                self.reject_fields(&[
                    ("weight", self.weight.is_some()),
                    ("sigma", self.sigma.is_some()),
                ])?;
                let args = BilateralArgs {
                    preset: self.preset.as_deref().map(str::parse).transpose()?,
                    window: self.window,
                    sigma_temporal: self.sigma_temporal,
                    sigma_spatial: self.sigma_spatial,
                    motion_thresh: self.motion_thresh,
                    edge_thresh: self.edge_thresh,
                };
                args.params()?;
                Ok(args.to_args())
            }
        }
    }

    fn plan(&self, index: usize, base_dir: &Path) -> Result<PlannedJob> {
        if self.passes == 0 {
            anyhow::bail!("'passes' must be at least 1");
        }
        if self.threads == Some(0) {
            anyhow::bail!("'threads' must be at least 1");
        }

        let input = base_dir.join(&self.input);
        let output = base_dir.join(&self.output);
        let mut args = vec![
            input.to_string_lossy().into_owned(),
            output.to_string_lossy().into_owned(),
        ];
        args.extend(self.range_args()?.to_args());
        args.extend(self.filter_args()?);
        if self.passes != 1 {
            args.extend(["--passes".to_string(), self.passes.to_string()]);
        }
        if let Some(threads) = self.threads {
            args.extend(["--threads".to_string(), threads.to_string()]);
        }

        Ok(PlannedJob {
            index,
            algorithm: self.algorithm,
            input,
            output,
            args,
        })
    }
}
