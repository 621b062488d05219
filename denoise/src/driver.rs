//! Pipeline driver: range resolution, passes, parallel frame filtering

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use mesh_common::{Frame, FrameStore, MeshAnimation};
use rayon::prelude::*;

use crate::cancel::CancelFlag;
use crate::denoiser::{Denoise, Denoiser};
use crate::error::{DenoiseError, Result};
use crate::range::FrameRange;
use crate::window::FrameWindow;

/// Timings and counts of one `process_file` call
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub range: FrameRange,
    pub frames_processed: usize,
    pub vertex_count: usize,
    pub passes: usize,
    pub read: Duration,
    pub filter: Duration,
    pub write: Duration,
    pub total: Duration,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    denoiser: Denoiser,
    start: Option<u32>,
    end: Option<u32>,
    passes: usize,
    cancel: CancelFlag,
}

impl Pipeline {
    pub fn new(denoiser: impl Into<Denoiser>) -> Self {
        Self {
            denoiser: denoiser.into(),
            start: None,
            end: None,
            passes: 1,
            cancel: CancelFlag::new(),
        }
    }

    /// Restrict filtering to `range`; frames outside it pass through
    pub fn with_range(mut self, range: FrameRange) -> Self {
        self.start = Some(range.start());
        self.end = Some(range.end());
        self
    }

    /// First frame to filter; the sequence start when unset
    pub fn with_start_frame(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Last frame to filter; the sequence end when unset
    pub fn with_end_frame(mut self, end: u32) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_passes(mut self, passes: usize) -> Result<Self> {
        if passes == 0 {
            return Err(DenoiseError::parameter("passes", "must be at least 1"));
        }
        self.passes = passes;
        Ok(self)
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that aborts a running job when set
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn denoiser(&self) -> &Denoiser {
        &self.denoiser
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Frame range that `run` would filter for `animation`
    pub fn resolve_range(&self, animation: &MeshAnimation) -> Result<FrameRange> {
        let first = animation.first_frame();
        let last = animation.last_frame();
        FrameRange::new(self.start.unwrap_or(first), self.end.unwrap_or(last))?
            .resolve(first, last)
    }

    /// Filter `animation`, returning a new animation with the same topology
    pub fn run(&self, animation: &MeshAnimation) -> Result<MeshAnimation> {
        let range = self.resolve_range(animation)?;
        self.filter_range(animation, range)
    }

    fn filter_range(&self, animation: &MeshAnimation, range: FrameRange) -> Result<MeshAnimation> {
        self.cancel.check()?;
        let lo = (range.start() - animation.first_frame()) as usize;
        let hi = (range.end() - animation.first_frame()) as usize;

        let denoiser = self.denoiser.with_max_window(range.len());
        if denoiser.window() != self.denoiser.window() {
            tracing::warn!(
                "Window size {} exceeds the {} frames in range {}, using {}",
                self.denoiser.window(),
                range.len(),
                range,
                denoiser.window()
            );
        }
        tracing::info!("{}", denoiser.describe());
        tracing::info!(
            "Processing frames {} ({} frames, {} vertices, {} pass{})",
            range,
            range.len(),
            animation.vertex_count(),
            self.passes,
            if self.passes == 1 { "" } else { "es" }
        );

        let mut frames = animation.frames().to_vec();
        for pass in 1..=self.passes {
            if self.passes > 1 {
                tracing::info!("Pass {}/{}", pass, self.passes);
            }
            let filtered = self.filter_pass(&denoiser, &frames[lo..=hi])?;
            frames.splice(lo..=hi, filtered);
        }

        Ok(animation.with_frames(frames)?)
    }

    /// One read-old/write-new pass over `frames`
    fn filter_pass(&self, denoiser: &Denoiser, frames: &[Frame]) -> Result<Vec<Frame>> {
        let plans = denoiser.plan(frames);
        let total = frames.len();
        let step = (total / 10).max(1);
        let done = AtomicUsize::new(0);

        frames
            .par_iter()
            .enumerate()
            .map(|(i, frame)| {
                self.cancel.check()?;
                let window = FrameWindow::new(frames, i, plans[i]);
                let positions = denoiser.denoise_frame(&window);

                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                if n % step == 0 || n == total {
                    tracing::info!("Processed frame {} ({}/{})", frame.number, n, total);
                }
                Ok(Frame::new(frame.number, positions))
            })
            .collect()
    }

    /// Load `input`, filter it and save the result to `output`.
    ///
    /// Nothing is written when filtering fails or is cancelled.
    pub fn process_file<I, O>(
        &self,
        input_store: &I,
        input: &Path,
        output_store: &O,
        output: &Path,
    ) -> Result<JobReport>
    where
        I: FrameStore + ?Sized,
        O: FrameStore + ?Sized,
    {
        let start = Instant::now();

        tracing::info!("Reading {}", input.display());
        let animation = input_store.load(input)?;
        let read = start.elapsed();
        tracing::info!(
            "Loaded {} frames ({}-{}), {} vertices",
            animation.frame_count(),
            animation.first_frame(),
            animation.last_frame(),
            animation.vertex_count()
        );

        let filter_start = Instant::now();
        let range = self.resolve_range(&animation)?;
        let filtered = self.filter_range(&animation, range)?;
        let filter = filter_start.elapsed();

        let write_start = Instant::now();
        tracing::info!("Writing {}", output.display());
        output_store.save(output, &filtered)?;
        let write = write_start.elapsed();

        let report = JobReport {
            range,
            frames_processed: range.len(),
            vertex_count: animation.vertex_count(),
            passes: self.passes,
            read,
            filter,
            write,
            total: start.elapsed(),
        };
        report.log();
        Ok(report)
    }
}

impl JobReport {
    fn log(&self) {
        tracing::info!("Performance:");
        tracing::info!("  Reading:   {:.3}s", self.read.as_secs_f64());
        tracing::info!("  Filtering: {:.3}s", self.filter.as_secs_f64());
        tracing::info!("  Writing:   {:.3}s", self.write.as_secs_f64());
        tracing::info!("  Total:     {:.3}s", self.total.as_secs_f64());
        let seconds = self.filter.as_secs_f64();
        if seconds > 0.0 {
            tracing::info!(
                "  {:.1} frames/s",
                (self.frames_processed * self.passes) as f64 / seconds
            );
        }
    }
}
