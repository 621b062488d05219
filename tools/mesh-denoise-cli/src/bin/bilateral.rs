//! bilateral-mesh-denoiser - edge-preserving trajectory smoothing

use anyhow::Result;
use clap::Parser;
use mesh_denoise_cli::args::BilateralCli;
use mesh_denoise_cli::job::{self, Job};
use mesh_denoise_cli::logging;

fn main() -> Result<()> {
    let cli = BilateralCli::parse();
    logging::init_tracing(cli.common.quiet);

    let job = Job::bilateral(&cli)?;
    job::configure_threads(cli.common.threads)?;
    job.run()?;
    Ok(())
}
