//! Weight kernels

use crate::params::{WeightKernel, WindowSize};

/// Total weight below which the original position is kept
pub const MIN_TOTAL_WEIGHT: f32 = 1e-8;

/// `exp(-d² / 2σ²)`; exactly 1 at zero distance and for infinite sigma
#[inline]
pub fn gaussian_weight(distance: f32, sigma: f32) -> f32 {
    if distance == 0.0 {
        return 1.0;
    }
    (-(distance * distance) / (2.0 * sigma * sigma)).exp()
}

/// Triangular falloff `max(0, 1 - |d| / (k + 1))`
#[inline]
pub fn linear_weight(offset: usize, half_width: usize) -> f32 {
    (1.0 - offset as f32 / (half_width + 1) as f32).max(0.0)
}

/// Unnormalized temporal weights indexed by frame offset `|d|`, `0..=k`.
///
/// The kernel is symmetric, so one entry covers both sides of the center.
/// Normalization happens per window, after truncation at sequence edges.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelTable {
    weights: Vec<f32>,
}

impl KernelTable {
    pub fn new(kernel: WeightKernel, window: WindowSize, sigma: f32) -> Self {
        let k = window.half_width();
        let weights = (0..=k)
            .map(|d| match kernel {
                WeightKernel::Linear => linear_weight(d, k),
                WeightKernel::Gaussian => gaussian_weight(d as f32, sigma),
            })
            .collect();
        Self { weights }
    }

    #[inline]
    pub fn weight(&self, offset: usize) -> f32 {
        self.weights.get(offset).copied().unwrap_or(0.0)
    }

    pub fn half_width(&self) -> usize {
        self.weights.len() - 1
    }

    /// Full symmetric table `[-k..=k]`, normalized to sum to 1
    pub fn normalized(&self) -> Vec<f32> {
        let k = self.half_width();
        let full: Vec<f32> = (0..=2 * k).map(|i| self.weight(i.abs_diff(k))).collect();
        let total: f32 = full.iter().sum();
        full.into_iter().map(|w| w / total).collect()
    }
}
