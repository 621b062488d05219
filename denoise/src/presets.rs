//! Named bilateral parameter bundles

use std::fmt;
use std::str::FromStr;

use crate::error::{DenoiseError, Result};
use crate::params::{BilateralParams, WindowSize};

/// Fixed bilateral settings, from least to most smoothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preset {
    Subtle,
    Medium,
    Strong,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Subtle, Preset::Medium, Preset::Strong];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Subtle => "subtle",
            Preset::Medium => "medium",
            Preset::Strong => "strong",
        }
    }

    /// (window, sigma_temporal, sigma_spatial)
    const fn values(self) -> (usize, f32, f32) {
        match self {
            Preset::Subtle => (7, 1.5, 0.08),
            Preset::Medium => (9, 2.5, 0.15),
            Preset::Strong => (15, 5.0, 0.35),
        }
    }

    pub fn params(self) -> BilateralParams {
        let (window, sigma_temporal, sigma_spatial) = self.values();
        BilateralParams {
            window: WindowSize::from_half_width(window / 2),
            sigma_temporal,
            sigma_spatial,
            ..BilateralParams::default()
        }
    }
}

impl FromStr for Preset {
    type Err = DenoiseError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DenoiseError::parameter(
                    "preset",
                    format!("unknown preset '{}' (available: subtle, medium, strong)", s),
                )
            })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
