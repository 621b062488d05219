//! Temporal denoiser
//!
//! Smooths each vertex trajectory with a symmetric linear or Gaussian window.
//! Weights depend only on frame distance, so one kernel table serves every
//! vertex and frame.

use mesh_common::Frame;

use crate::denoiser::Denoise;
use crate::error::Result;
use crate::kernel::KernelTable;
use crate::params::TemporalParams;
use crate::window::{FramePlan, FrameWindow};

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalDenoiser {
    params: TemporalParams,
    table: KernelTable,
}

impl TemporalDenoiser {
    pub fn new(params: TemporalParams) -> Result<Self> {
        params.validate()?;
        let table = KernelTable::new(params.kernel, params.window, params.sigma);
        Ok(Self { params, table })
    }

    pub fn params(&self) -> &TemporalParams {
        &self.params
    }

    pub fn table(&self) -> &KernelTable {
        &self.table
    }

    pub fn with_max_window(&self, frames: usize) -> Self {
        let window = self.params.window.clamp_to(frames);
        if window == self.params.window {
            return self.clone();
        }
        let params = TemporalParams {
            window,
            ..self.params
        };
        Self {
            table: KernelTable::new(params.kernel, params.window, params.sigma),
            params,
        }
    }
}

impl Denoise for TemporalDenoiser {
    fn plan(&self, frames: &[Frame]) -> Vec<FramePlan> {
        vec![FramePlan::uniform(self.table.half_width()); frames.len()]
    }

    fn accumulate<F: FnMut(&Frame, f32)>(&self, window: &FrameWindow<'_>, _vertex: usize, mut visit: F) {
        for (distance, frame) in window.neighbors() {
            visit(frame, self.table.weight(distance));
        }
    }
}
