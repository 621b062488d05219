//! Filter parameters and their validation

use std::fmt;
use std::str::FromStr;

use crate::error::{DenoiseError, Result};
use crate::presets::Preset;

/// Default temporal window (frames)
pub const DEFAULT_TEMPORAL_WINDOW: usize = 5;
/// Default Gaussian sigma of the temporal filter (frames)
pub const DEFAULT_TEMPORAL_SIGMA: f32 = 1.0;

/// Default bilateral window, tuned for heavy scan noise
pub const DEFAULT_BILATERAL_WINDOW: usize = 15;
pub const DEFAULT_SIGMA_TEMPORAL: f32 = 4.0;
pub const DEFAULT_SIGMA_SPATIAL: f32 = 0.25;

/// Odd number of frames centered on the frame being smoothed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowSize(usize);

impl WindowSize {
    /// A window holding only the center frame
    pub const IDENTITY: Self = Self(1);

    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(DenoiseError::parameter("window size", "must be at least 1"));
        }
        if size % 2 == 0 {
            return Err(DenoiseError::parameter(
                "window size",
                format!("{} is even, window sizes must be odd", size),
            ));
        }
        Ok(Self(size))
    }

    pub fn from_half_width(half_width: usize) -> Self {
        Self(2 * half_width + 1)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Frames on each side of the center: `(size - 1) / 2`
    pub fn half_width(self) -> usize {
        (self.0 - 1) / 2
    }

    /// Largest odd window not exceeding `frames` (at least 1)
    pub fn clamp_to(self, frames: usize) -> Self {
        if self.0 <= frames {
            return self;
        }
        let limit = frames.max(1);
        Self(if limit % 2 == 0 { limit - 1 } else { limit })
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weight kernel of the temporal filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeightKernel {
    /// Triangular falloff `max(0, 1 - |d| / (k + 1))`
    #[default]
    Linear,
    /// `exp(-d² / 2σ²)`
    Gaussian,
}

impl WeightKernel {
    pub fn name(self) -> &'static str {
        match self {
            WeightKernel::Linear => "linear",
            WeightKernel::Gaussian => "gaussian",
        }
    }
}

impl FromStr for WeightKernel {
    type Err = DenoiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(WeightKernel::Linear),
            "gaussian" => Ok(WeightKernel::Gaussian),
            other => Err(DenoiseError::parameter(
                "weight kernel",
                format!("unknown kernel '{}' (available: linear, gaussian)", other),
            )),
        }
    }
}

impl fmt::Display for WeightKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sigmas must be positive; `+inf` is allowed and makes the kernel uniform
pub fn validate_sigma(name: &'static str, value: f32) -> Result<f32> {
    if value.is_nan() || value <= 0.0 {
        return Err(DenoiseError::parameter(
            name,
            format!("{} is not positive", value),
        ));
    }
    Ok(value)
}

fn validate_threshold(name: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DenoiseError::parameter(
            name,
            format!("{} is not a positive finite number", value),
        ));
    }
    Ok(value)
}

/// Temporal filter settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalParams {
    pub window: WindowSize,
    pub kernel: WeightKernel,
    /// Only used by the Gaussian kernel
    pub sigma: f32,
}

impl Default for TemporalParams {
    fn default() -> Self {
        Self {
            window: WindowSize(DEFAULT_TEMPORAL_WINDOW),
            kernel: WeightKernel::Linear,
            sigma: DEFAULT_TEMPORAL_SIGMA,
        }
    }
}

impl TemporalParams {
    pub fn new(window: usize, kernel: WeightKernel, sigma: f32) -> Result<Self> {
        Ok(Self {
            window: WindowSize::new(window)?,
            kernel,
            sigma: validate_sigma("sigma", sigma)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        WindowSize::new(self.window.get())?;
        validate_sigma("sigma", self.sigma)?;
        Ok(())
    }
}

/// Bilateral filter settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralParams {
    pub window: WindowSize,
    /// Temporal falloff (frames)
    pub sigma_temporal: f32,
    /// Falloff over per-vertex displacement (scene units)
    pub sigma_spatial: f32,
    /// Enables per-frame adaptive windows driven by mean vertex motion
    pub motion_threshold: Option<f32>,
    /// Enables sharpening of the spatial term on high-motion frames
    pub edge_threshold: Option<f32>,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            window: WindowSize(DEFAULT_BILATERAL_WINDOW),
            sigma_temporal: DEFAULT_SIGMA_TEMPORAL,
            sigma_spatial: DEFAULT_SIGMA_SPATIAL,
            motion_threshold: None,
            edge_threshold: None,
        }
    }
}

impl BilateralParams {
    pub fn new(window: usize, sigma_temporal: f32, sigma_spatial: f32) -> Result<Self> {
        Ok(Self {
            window: WindowSize::new(window)?,
            sigma_temporal: validate_sigma("sigma_temporal", sigma_temporal)?,
            sigma_spatial: validate_sigma("sigma_spatial", sigma_spatial)?,
            motion_threshold: None,
            edge_threshold: None,
        })
    }

    pub fn from_preset(preset: Preset) -> Self {
        preset.params()
    }

    pub fn with_motion_threshold(mut self, threshold: f32) -> Result<Self> {
        self.motion_threshold = Some(validate_threshold("motion threshold", threshold)?);
        Ok(self)
    }

    pub fn with_edge_threshold(mut self, threshold: f32) -> Result<Self> {
        self.edge_threshold = Some(validate_threshold("edge threshold", threshold)?);
        Ok(self)
    }

    pub fn is_motion_adaptive(&self) -> bool {
        self.motion_threshold.is_some() || self.edge_threshold.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        WindowSize::new(self.window.get())?;
        validate_sigma("sigma_temporal", self.sigma_temporal)?;
        validate_sigma("sigma_spatial", self.sigma_spatial)?;
        if let Some(t) = self.motion_threshold {
            validate_threshold("motion threshold", t)?;
        }
        if let Some(t) = self.edge_threshold {
            validate_threshold("edge threshold", t)?;
        }
        Ok(())
    }
}
