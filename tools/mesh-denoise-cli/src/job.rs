//! One denoising job: resolved arguments to a finished output file

use std::path::PathBuf;

use anyhow::{Context, Result};
use mesh_common::AnyStore;
use mesh_denoise::{CancelFlag, Denoiser, JobReport, Pipeline};

use crate::args::{BilateralCli, CommonArgs, RangeArgs, TemporalCli};

/// Fully validated job, ready to run in-process
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub range: RangeArgs,
    pub denoiser: Denoiser,
    pub passes: usize,
}

impl Job {
    fn from_common(common: &CommonArgs, denoiser: Denoiser) -> Result<Self> {
        common.range.validate()?;
        Ok(Self {
            input: common.input.clone(),
            output: common.output.clone(),
            range: common.range.clone(),
            denoiser,
            passes: common.passes,
        })
    }

    pub fn temporal(cli: &TemporalCli) -> Result<Self> {
        let denoiser = Denoiser::temporal(cli.filter.params()?)?;
        Self::from_common(&cli.common, denoiser)
    }

    pub fn bilateral(cli: &BilateralCli) -> Result<Self> {
        let denoiser = Denoiser::bilateral(cli.filter.params()?)?;
        Self::from_common(&cli.common, denoiser)
    }

    pub fn pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(self.denoiser.clone()).with_passes(self.passes)?;
        let (start, end) = self.range.bounds();
        if let Some(start) = start {
            pipeline = pipeline.with_start_frame(start);
        }
        if let Some(end) = end {
            pipeline = pipeline.with_end_frame(end);
        }
        Ok(pipeline)
    }

    pub fn run(&self) -> Result<JobReport> {
        self.execute(self.pipeline()?)
    }

    /// Run with a flag another thread can set to stop the job before output is written
    pub fn run_with_cancel(&self, cancel: CancelFlag) -> Result<JobReport> {
        self.execute(self.pipeline()?.with_cancel_flag(cancel))
    }

    fn execute(&self, pipeline: Pipeline) -> Result<JobReport> {
        let input_store = AnyStore::for_path(&self.input)?;
        let output_store = AnyStore::for_path(&self.output)?;
        tracing::debug!("{} -> {}", input_store.name(), output_store.name());

        let report = pipeline
            .process_file(&input_store, &self.input, &output_store, &self.output)
            .with_context(|| {
                format!(
                    "Failed to denoise {} into {}",
                    self.input.display(),
                    self.output.display()
                )
            })?;
        tracing::info!("Done!");
        Ok(report)
    }
}

/// Size the global rayon pool; leaves the default when `threads` is unset
pub fn configure_threads(threads: Option<usize>) -> Result<()> {
    let Some(threads) = threads else {
        return Ok(());
    };
    if threads == 0 {
        anyhow::bail!("--threads must be at least 1");
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to configure worker threads")?;
    tracing::info!("Using {} worker threads", threads);
    Ok(())
}
