//! Bilateral mesh denoiser
//!
//! Each frame `j` in the window contributes
//! `exp(-d²/2σt²) · exp(-‖p(j) - p(i)‖²/2σs²)` to vertex `p` at frame `i`.
//! A large per-frame displacement shrinks the spatial term, so sharp motion
//! survives while small jitter is averaged out.
//!
//! With motion adaptation enabled the window width and the sharpness of the
//! spatial term are chosen per frame from the mean vertex motion (see
//! [`crate::motion`]).

use mesh_common::Frame;

use crate::denoiser::Denoise;
use crate::error::Result;
use crate::kernel::gaussian_weight;
use crate::motion::{adaptive_window, edge_exponent, motion_magnitudes};
use crate::params::BilateralParams;
use crate::window::{FramePlan, FrameWindow};

#[derive(Debug, Clone, PartialEq)]
pub struct BilateralDenoiser {
    params: BilateralParams,
}

impl BilateralDenoiser {
    pub fn new(params: BilateralParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BilateralParams {
        &self.params
    }

    pub fn with_max_window(&self, frames: usize) -> Self {
        let params = BilateralParams {
            window: self.params.window.clamp_to(frames),
            ..self.params
        };
        Self { params }
    }
}

impl Denoise for BilateralDenoiser {
    fn plan(&self, frames: &[Frame]) -> Vec<FramePlan> {
        let base = self.params.window;
        if !self.params.is_motion_adaptive() {
            return vec![FramePlan::uniform(base.half_width()); frames.len()];
        }

        let motion = motion_magnitudes(frames);
        let plans: Vec<FramePlan> = motion
            .iter()
            .map(|&m| {
                let window = match self.params.motion_threshold {
                    Some(t) => adaptive_window(base, m, t).clamp_to(frames.len()),
                    None => base,
                };
                FramePlan {
                    half_width: window.half_width(),
                    edge_exponent: self
                        .params
                        .edge_threshold
                        .map_or(1.0, |t| edge_exponent(m, t)),
                }
            })
            .collect();

        if !motion.is_empty() {
            let average = motion.iter().sum::<f32>() / motion.len() as f32;
            let min = plans.iter().map(|p| 2 * p.half_width + 1).min().unwrap_or(1);
            let max = plans.iter().map(|p| 2 * p.half_width + 1).max().unwrap_or(1);
            tracing::info!("Average motion magnitude: {:.6}", average);
            tracing::info!("Window size range: {}-{}", min, max);
        }
        plans
    }

    fn accumulate<F: FnMut(&Frame, f32)>(&self, window: &FrameWindow<'_>, vertex: usize, mut visit: F) {
        let center = window.center().positions[vertex];
        let exponent = window.plan().edge_exponent;
        for (distance, frame) in window.neighbors() {
            let temporal = gaussian_weight(distance as f32, self.params.sigma_temporal);
            let displacement = frame.positions[vertex].distance(center);
            let mut spatial = gaussian_weight(displacement, self.params.sigma_spatial);
            if exponent != 1.0 {
                spatial = spatial.powf(exponent);
            }
            visit(frame, temporal * spatial);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn ramp(values: &[f32]) -> Vec<Frame> {
        values
            .iter()
            .enumerate()
            .map(|(i, &x)| Frame::new(i as u32 + 1, vec![Vec3::new(x, 0.0, 0.0)]))
            .collect()
    }

    #[test]
    fn test_displacement_downweights_neighbor() {
        let frames = ramp(&[0.0, 1.0, 2.0, 10.0, 11.0]);
        let d = BilateralDenoiser::new(BilateralParams::new(3, 1.0, 0.5).unwrap()).unwrap();
        let plans = d.plan(&frames);
        let window = FrameWindow::new(&frames, 3, plans[3]);
        let weights = d.normalized_weights(&window, 0);

        assert_eq!(weights.len(), 3);
        let w = |n: u32| weights.iter().find(|&&(f, _)| f == n).unwrap().1;
        assert!(w(3) < 1e-6, "frame 3 is 8 units away: {}", w(3));
        assert!(w(5) > w(3));
        assert!(w(4) > 0.9);
    }

    #[test]
    fn test_weights_sum_to_one_at_edges() {
        let frames = ramp(&[0.0, 0.1, -0.2, 0.05, 3.0, 3.1]);
        let d = BilateralDenoiser::new(BilateralParams::new(5, 2.0, 0.2).unwrap()).unwrap();
        let plans = d.plan(&frames);
        for i in 0..frames.len() {
            let window = FrameWindow::new(&frames, i, plans[i]);
            let sum: f32 = d.normalized_weights(&window, 0).iter().map(|&(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-6, "frame {i}: {sum}");
        }
    }

    #[test]
    fn test_static_vertex_unchanged() {
        let frames = ramp(&[4.0; 7]);
        let d = BilateralDenoiser::new(BilateralParams::default()).unwrap();
        let plans = d.plan(&frames);
        for i in 0..frames.len() {
            let p = d.denoise(&FrameWindow::new(&frames, i, plans[i]), 0);
            assert!((p.x - 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uniform_plan_without_motion_adaptation() {
        let frames = ramp(&[0.0, 5.0, 0.0, 5.0]);
        let d = BilateralDenoiser::new(BilateralParams::new(5, 1.0, 1.0).unwrap()).unwrap();
        assert!(d.plan(&frames).iter().all(|p| *p == FramePlan::uniform(2)));
    }

    #[test]
    fn test_motion_adaptive_plan() {
        // Still start, violent end
        let frames = ramp(&[0.0, 0.0, 0.0, 0.0, 5.0, -5.0, 5.0, -5.0]);
        let params = BilateralParams::new(9, 2.0, 0.25)
            .unwrap()
            .with_motion_threshold(0.1)
            .unwrap()
            .with_edge_threshold(0.15)
            .unwrap();
        let d = BilateralDenoiser::new(params).unwrap();
        let plans = d.plan(&frames);

        // Still frames widen (clamped to the 8 available frames -> 7)
        assert_eq!(plans[0].half_width, 3);
        assert_eq!(plans[0].edge_exponent, 1.0);
        // Fast frames narrow and sharpen the spatial term
        assert_eq!(plans[6].half_width, 1);
        assert_eq!(plans[6].edge_exponent, 2.0);
    }

    #[test]
    fn test_edge_exponent_sharpens_spatial_weight() {
        let frames = ramp(&[0.0, 0.2, 0.4]);
        let d = BilateralDenoiser::new(BilateralParams::new(3, 1.0, 0.5).unwrap()).unwrap();
        let soft = FrameWindow::new(&frames, 1, FramePlan::uniform(1));
        let sharp = FrameWindow::new(
            &frames,
            1,
            FramePlan {
                half_width: 1,
                edge_exponent: 2.0,
            },
        );
        let neighbor = |w: &FrameWindow<'_>| d.normalized_weights(w, 0)[0].1;
        assert!(neighbor(&sharp) < neighbor(&soft));
    }
}
