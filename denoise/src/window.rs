//! Frame windows around the frame being smoothed

use mesh_common::Frame;

/// Per-frame filter setup, computed once per pass before any frame is filtered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    /// Frames on each side of the center
    pub half_width: usize,
    /// Power applied to the spatial weight; 1 leaves it unchanged
    pub edge_exponent: f32,
}

impl FramePlan {
    pub fn uniform(half_width: usize) -> Self {
        Self {
            half_width,
            edge_exponent: 1.0,
        }
    }
}

/// Read-only view of `[center - k, center + k]`, truncated to the frames available.
///
/// Truncation is the boundary policy: missing frames are simply absent and
/// the filters renormalize over what remains.
#[derive(Debug, Clone, Copy)]
pub struct FrameWindow<'a> {
    frames: &'a [Frame],
    center: usize,
    start: usize,
    end: usize,
    plan: FramePlan,
}

impl<'a> FrameWindow<'a> {
    /// `center` indexes into `frames`, which must not be empty
    pub fn new(frames: &'a [Frame], center: usize, plan: FramePlan) -> Self {
        debug_assert!(center < frames.len());
        let start = center.saturating_sub(plan.half_width);
        let end = (center + plan.half_width).min(frames.len() - 1);
        Self {
            frames,
            center,
            start,
            end,
            plan,
        }
    }

    pub fn center(&self) -> &'a Frame {
        &self.frames[self.center]
    }

    pub fn plan(&self) -> FramePlan {
        self.plan
    }

    /// Number of frames actually inside the window (never zero)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether a sequence edge cut the window short
    pub fn is_truncated(&self) -> bool {
        self.len() < 2 * self.plan.half_width + 1
    }

    /// `(temporal distance |i - j|, frame)` for every frame in the window, in order
    pub fn neighbors(&self) -> impl Iterator<Item = (usize, &'a Frame)> + use<'a> {
        let center = self.center;
        (self.start..=self.end).map({
            let frames = self.frames;
            move |j| (j.abs_diff(center), &frames[j])
        })
    }
}
