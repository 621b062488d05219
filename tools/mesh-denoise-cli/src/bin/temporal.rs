//! temporal-mesh-denoiser - linear/Gaussian trajectory smoothing

use anyhow::Result;
use clap::Parser;
use mesh_denoise_cli::args::TemporalCli;
use mesh_denoise_cli::job::{self, Job};
use mesh_denoise_cli::logging;

fn main() -> Result<()> {
    let cli = TemporalCli::parse();
    logging::init_tracing(cli.common.quiet);

    let job = Job::temporal(&cli)?;
    job::configure_threads(cli.common.threads)?;
    job.run()?;
    Ok(())
}
