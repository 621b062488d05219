//! The capability shared by both filters and the closed set of filters

use glam::Vec3;
use mesh_common::Frame;
use rayon::prelude::*;

use crate::bilateral::BilateralDenoiser;
use crate::error::Result;
use crate::kernel::MIN_TOTAL_WEIGHT;
use crate::params::{BilateralParams, TemporalParams, WindowSize};
use crate::temporal::TemporalDenoiser;
use crate::window::{FramePlan, FrameWindow};

/// Vertices handed to one rayon task when filtering a frame
const VERTEX_CHUNK: usize = 512;

/// Windowed per-vertex smoothing.
///
/// Implementors only describe weights through [`Denoise::accumulate`]; the
/// weighted average, its renormalization over truncated windows and the
/// fallback for a vanishing total are shared.
pub trait Denoise: Sync {
    /// Window and edge setup for every frame of a pass
    fn plan(&self, frames: &[Frame]) -> Vec<FramePlan>;

    /// Report the raw weight of each frame in `window` for one vertex
    fn accumulate<F: FnMut(&Frame, f32)>(&self, window: &FrameWindow<'_>, vertex: usize, visit: F);

    /// Weighted average of the vertex over the window
    fn denoise(&self, window: &FrameWindow<'_>, vertex: usize) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut total = 0.0f32;
        self.accumulate(window, vertex, |frame, weight| {
            sum += frame.positions[vertex] * weight;
            total += weight;
        });
        if total > MIN_TOTAL_WEIGHT {
            sum / total
        } else {
            window.center().positions[vertex]
        }
    }

    /// `(frame number, weight)` pairs summing to 1, as used by [`Denoise::denoise`]
    fn normalized_weights(&self, window: &FrameWindow<'_>, vertex: usize) -> Vec<(u32, f32)> {
        let mut weights = Vec::with_capacity(window.len());
        self.accumulate(window, vertex, |frame, weight| weights.push((frame.number, weight)));
        let total: f32 = weights.iter().map(|&(_, w)| w).sum();
        if total > MIN_TOTAL_WEIGHT {
            weights.iter_mut().for_each(|(_, w)| *w /= total);
        } else {
            let center = window.center().number;
            weights
                .iter_mut()
                .for_each(|(n, w)| *w = if *n == center { 1.0 } else { 0.0 });
        }
        weights
    }

    /// New positions for every vertex of the window's center frame
    fn denoise_frame(&self, window: &FrameWindow<'_>) -> Vec<Vec3> {
        let vertex_count = window.center().vertex_count();
        (0..vertex_count)
            .into_par_iter()
            .with_min_len(VERTEX_CHUNK)
            .map(|v| self.denoise(window, v))
            .collect()
    }
}

/// Temporal or bilateral, dispatched through [`Denoise`]
#[derive(Debug, Clone, PartialEq)]
pub enum Denoiser {
    Temporal(TemporalDenoiser),
    Bilateral(BilateralDenoiser),
}

impl Denoiser {
    pub fn temporal(params: TemporalParams) -> Result<Self> {
        Ok(Self::Temporal(TemporalDenoiser::new(params)?))
    }

    pub fn bilateral(params: BilateralParams) -> Result<Self> {
        Ok(Self::Bilateral(BilateralDenoiser::new(params)?))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Temporal(_) => "temporal",
            Self::Bilateral(_) => "bilateral",
        }
    }

    /// Configured (base) window
    pub fn window(&self) -> WindowSize {
        match self {
            Self::Temporal(d) => d.params().window,
            Self::Bilateral(d) => d.params().window,
        }
    }

    /// Copy whose window fits in `frames` frames
    pub fn with_max_window(&self, frames: usize) -> Self {
        match self {
            Self::Temporal(d) => Self::Temporal(d.with_max_window(frames)),
            Self::Bilateral(d) => Self::Bilateral(d.with_max_window(frames)),
        }
    }

    /// One-line parameter summary for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Temporal(d) => {
                let p = d.params();
                format!("temporal: window={}, weight={}, sigma={}", p.window, p.kernel, p.sigma)
            }
            Self::Bilateral(d) => {
                let p = d.params();
                let mut s = format!(
                    "bilateral: window={}, sigma_temporal={}, sigma_spatial={}",
                    p.window, p.sigma_temporal, p.sigma_spatial
                );
                if let Some(t) = p.motion_threshold {
                    s.push_str(&format!(", motion_threshold={}", t));
                }
                if let Some(t) = p.edge_threshold {
                    s.push_str(&format!(", edge_threshold={}", t));
                }
                s
            }
        }
    }
}

impl From<TemporalDenoiser> for Denoiser {
    fn from(d: TemporalDenoiser) -> Self {
        Self::Temporal(d)
    }
}

impl From<BilateralDenoiser> for Denoiser {
    fn from(d: BilateralDenoiser) -> Self {
        Self::Bilateral(d)
    }
}

impl Denoise for Denoiser {
    fn plan(&self, frames: &[Frame]) -> Vec<FramePlan> {
        match self {
            Self::Temporal(d) => d.plan(frames),
            Self::Bilateral(d) => d.plan(frames),
        }
    }

    fn accumulate<F: FnMut(&Frame, f32)>(&self, window: &FrameWindow<'_>, vertex: usize, visit: F) {
        match self {
            Self::Temporal(d) => d.accumulate(window, vertex, visit),
            Self::Bilateral(d) => d.accumulate(window, vertex, visit),
        }
    }
}
