//! Per-frame motion analysis for the motion-adaptive bilateral filter
//!
//! Motion magnitude of a frame is the mean vertex displacement to its
//! neighbours: forward for the first frame, backward for the last, and the
//! average of both in between.

use mesh_common::Frame;
use rayon::prelude::*;

use crate::params::WindowSize;

/// Smallest adaptive window
pub const MIN_ADAPTIVE_WINDOW: usize = 3;
/// Largest adaptive window
pub const MAX_ADAPTIVE_WINDOW: usize = 15;

/// Floor for motion when dividing by it
const MIN_MOTION: f32 = 0.001;

/// Mean displacement per frame; zero for a single frame or an empty mesh
pub fn motion_magnitudes(frames: &[Frame]) -> Vec<f32> {
    let n = frames.len();
    if n < 2 {
        return vec![0.0; n];
    }

    (0..n)
        .into_par_iter()
        .map(|i| {
            let frame = &frames[i];
            let vertex_count = frame.vertex_count();
            if vertex_count == 0 {
                return 0.0;
            }
            let total: f32 = if i == 0 {
                displacement(&frames[1], frame)
            } else if i == n - 1 {
                displacement(frame, &frames[i - 1])
            } else {
                (0..vertex_count)
                    .map(|v| {
                        let back = frame.positions[v].distance(frames[i - 1].positions[v]);
                        let forward = frames[i + 1].positions[v].distance(frame.positions[v]);
                        (back + forward) * 0.5
                    })
                    .sum()
            };
            total / vertex_count as f32
        })
        .collect()
}

fn displacement(a: &Frame, b: &Frame) -> f32 {
    a.positions
        .iter()
        .zip(&b.positions)
        .map(|(p, q)| p.distance(*q))
        .sum()
}

/// Narrow windows for fast frames, widen them for still frames.
///
/// Above the threshold the window scales by `max(0.3, 1 - m/τ)`; at or
/// below it by `min(2, 1 + τ/m)`. The result is bumped to odd and kept in
/// `[MIN_ADAPTIVE_WINDOW, MAX_ADAPTIVE_WINDOW]`.
pub fn adaptive_window(base: WindowSize, motion: f32, threshold: f32) -> WindowSize {
    let scale = if motion > threshold {
        (1.0 - motion / threshold).max(0.3)
    } else {
        (1.0 + threshold / motion.max(MIN_MOTION)).min(2.0)
    };
    let mut size = (base.get() as f32 * scale) as usize;
    if size % 2 == 0 {
        size += 1;
    }
    let size = size.clamp(MIN_ADAPTIVE_WINDOW, MAX_ADAPTIVE_WINDOW);
    WindowSize::from_half_width(size / 2)
}

/// Exponent for the spatial weight: `min(2, m/ε)` above the threshold, else 1
pub fn edge_exponent(motion: f32, threshold: f32) -> f32 {
    if motion > threshold {
        (motion / threshold).min(2.0)
    } else {
        1.0
    }
}
