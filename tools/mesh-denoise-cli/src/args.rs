//! Command-line arguments shared by the denoiser executables
//!
//! Filter flags resolve as: explicit flag, then preset (bilateral only), then
//! the built-in default. The same structures render back to argv so the
//! launcher can hand manifest jobs to the companion executables.

use std::path::PathBuf;

use clap::{Args, Parser};
use mesh_denoise::{BilateralParams, FrameRange, Preset, Result, TemporalParams, WeightKernel};

/// Frames to process, 1-based and inclusive
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RangeArgs {
    /// First and last frame to process, 1-based and inclusive
    #[arg(
        long,
        num_args = 2,
        value_names = ["START", "END"],
        conflicts_with_all = ["start_frame", "end_frame"]
    )]
    pub maya_range: Option<Vec<u32>>,

    /// First frame to process (default: first frame of the input)
    #[arg(long)]
    pub start_frame: Option<u32>,

    /// Last frame to process (default: last frame of the input)
    #[arg(long)]
    pub end_frame: Option<u32>,
}

impl RangeArgs {
    /// `(start, end)`, either side open when unset
    pub fn bounds(&self) -> (Option<u32>, Option<u32>) {
        match self.maya_range.as_deref() {
            Some(&[start, end]) => (Some(start), Some(end)),
            _ => (self.start_frame, self.end_frame),
        }
    }

    /// Reject ranges that are invalid whatever the input holds
    pub fn validate(&self) -> Result<()> {
        match self.bounds() {
            (Some(start), Some(end)) => FrameRange::new(start, end).map(|_| ()),
            (Some(start), None) => FrameRange::new(start, start).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self.bounds() {
            (Some(start), Some(end)) => {
                args.extend(["--maya-range".to_string(), start.to_string(), end.to_string()]);
            }
            (start, end) => {
                if let Some(start) = start {
                    args.extend(["--start-frame".to_string(), start.to_string()]);
                }
                if let Some(end) = end {
                    args.extend(["--end-frame".to_string(), end.to_string()]);
                }
            }
        }
        args
    }
}

/// Input, output and execution flags common to both denoisers
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Input: `.vcache` file or directory of per-frame OBJ files
    pub input: PathBuf,

    /// Output: `.vcache` file or directory for per-frame OBJ files
    pub output: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Apply the filter this many times
    #[arg(long, default_value_t = 1)]
    pub passes: usize,

    /// Worker threads (default: one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Temporal filter flags
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TemporalArgs {
    /// Odd window size in frames [default: 5]
    #[arg(long)]
    pub window: Option<usize>,

    /// Weight kernel: linear or gaussian [default: linear]
    #[arg(long)]
    pub weight: Option<WeightKernel>,

    /// Gaussian sigma in frames [default: 1.0]
    #[arg(long)]
    pub sigma: Option<f32>,
}

impl TemporalArgs {
    pub fn params(&self) -> Result<TemporalParams> {
        let defaults = TemporalParams::default();
        TemporalParams::new(
            self.window.unwrap_or(defaults.window.get()),
            self.weight.unwrap_or(defaults.kernel),
            self.sigma.unwrap_or(defaults.sigma),
        )
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(window) = self.window {
            args.extend(["--window".to_string(), window.to_string()]);
        }
        if let Some(weight) = self.weight {
            args.extend(["--weight".to_string(), weight.to_string()]);
        }
        if let Some(sigma) = self.sigma {
            args.extend(["--sigma".to_string(), sigma.to_string()]);
        }
        args
    }
}

/// Bilateral filter flags
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct BilateralArgs {
    /// Parameter preset: subtle, medium or strong
    #[arg(long)]
    pub preset: Option<Preset>,

    /// Odd window size in frames [default: 15]
    #[arg(long)]
    pub window: Option<usize>,

    /// Temporal sigma in frames [default: 4.0]
    #[arg(long)]
    pub sigma_temporal: Option<f32>,

    /// Spatial sigma in scene units [default: 0.25]
    #[arg(long)]
    pub sigma_spatial: Option<f32>,

    /// Adapt the window per frame to mean vertex motion above this threshold
    #[arg(long)]
    pub motion_thresh: Option<f32>,

    /// Sharpen the spatial weight on frames moving faster than this
    #[arg(long)]
    pub edge_thresh: Option<f32>,
}

impl BilateralArgs {
    pub fn params(&self) -> Result<BilateralParams> {
        let base = self.preset.map(Preset::params).unwrap_or_default();
        let mut params = BilateralParams::new(
            self.window.unwrap_or(base.window.get()),
            self.sigma_temporal.unwrap_or(base.sigma_temporal),
            self.sigma_spatial.unwrap_or(base.sigma_spatial),
        )?;
        if let Some(threshold) = self.motion_thresh {
            params = params.with_motion_threshold(threshold)?;
        }
        if let Some(threshold) = self.edge_thresh {
            params = params.with_edge_threshold(threshold)?;
        }
        Ok(params)
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(preset) = self.preset {
            args.extend(["--preset".to_string(), preset.to_string()]);
        }
        let flags: [(&str, Option<String>); 5] = [
            ("--window", self.window.map(|w| w.to_string())),
            ("--sigma-temporal", self.sigma_temporal.map(|s| s.to_string())),
            ("--sigma-spatial", self.sigma_spatial.map(|s| s.to_string())),
            ("--motion-thresh", self.motion_thresh.map(|t| t.to_string())),
            ("--edge-thresh", self.edge_thresh.map(|t| t.to_string())),
        ];
        for (flag, value) in flags {
            if let Some(value) = value {
                args.extend([flag.to_string(), value]);
            }
        }
        args
    }
}

/// Smooth every vertex trajectory with a linear or Gaussian window
#[derive(Parser, Debug)]
#[command(name = "temporal-mesh-denoiser")]
#[command(version)]
pub struct TemporalCli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub filter: TemporalArgs,
}

/// Edge-preserving smoothing with temporal and spatial Gaussian weights
#[derive(Parser, Debug)]
#[command(name = "bilateral-mesh-denoiser")]
#[command(version)]
pub struct BilateralCli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub filter: BilateralArgs,
}
