//! mesh-denoise - job launcher and frame store utility
//!
//! Runs denoise.toml jobs through the companion denoiser executables and
//! inspects or converts `.vcache` files and OBJ sequences.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mesh_common::{AnyStore, FrameStore, MeshAnimation, Vec3};
use mesh_denoise::motion::motion_magnitudes;
use std::path::{Path, PathBuf};

use mesh_denoise_cli::logging;
use mesh_denoise_cli::manifest::{DenoiseManifest, MANIFEST_FILE};
use mesh_denoise_cli::runner;

#[derive(Parser)]
#[command(name = "mesh-denoise")]
#[command(about = "Dynamic mesh denoising jobs and frame store tools")]
#[command(version)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job of a manifest
    Run {
        /// Path to denoise.toml manifest
        #[arg(default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Directory containing the denoiser executables
        #[arg(long)]
        bin_dir: Option<PathBuf>,
    },

    /// Print topology and motion statistics of a frame store
    Info {
        /// `.vcache` file or OBJ sequence directory
        input: PathBuf,
    },

    /// Convert between `.vcache` files and OBJ sequence directories
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.quiet);

    match cli.command {
        Commands::Run { manifest, bin_dir } => run_manifest(&manifest, bin_dir.as_deref()),
        Commands::Info { input } => info(&input),
        Commands::Convert { input, output } => convert(&input, &output),
    }
}

fn run_manifest(path: &Path, bin_dir: Option<&Path>) -> Result<()> {
    let manifest = DenoiseManifest::load(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    let jobs = manifest.plan(base_dir)?;

    for job in &jobs {
        let program = runner::find_executable(job.algorithm.executable(), bin_dir)?;
        tracing::info!(
            "Job {}/{}: {} {} -> {}",
            job.index,
            jobs.len(),
            job.algorithm.executable(),
            job.input.display(),
            job.output.display()
        );
        runner::run_streaming(&program, &job.args, None, |line| {
            tracing::info!("[job {}] {}", job.index, line)
        })
        .with_context(|| format!("Job {} failed", job.index))?;
    }

    tracing::info!("Completed {} job(s)", jobs.len());
    Ok(())
}

fn load(path: &Path) -> Result<MeshAnimation> {
    let store = AnyStore::for_path(path)?;
    store
        .load(path)
        .with_context(|| format!("Failed to load {} {}", store.name(), path.display()))
}

fn info(path: &Path) -> Result<()> {
    let animation = load(path)?;
    let topology = animation.topology();

    println!("{}", path.display());
    println!("  Name:       {}", topology.name);
    println!("  Vertices:   {}", topology.vertex_count);
    println!("  Faces:      {}", topology.face_count());
    println!(
        "  Frames:     {} ({}-{})",
        animation.frame_count(),
        animation.first_frame(),
        animation.last_frame()
    );
    println!("  Frame rate: {} fps", animation.frame_rate());

    let (min, max) = animation
        .frames()
        .iter()
        .flat_map(|f| f.positions.iter())
        .fold((Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)), |(lo, hi), p| {
            (lo.min(*p), hi.max(*p))
        });
    if min.is_finite() && max.is_finite() {
        println!("  Bounds:     {:?} .. {:?}", min.to_array(), max.to_array());
    }

    let motion = motion_magnitudes(animation.frames());
    if !motion.is_empty() {
        let mean = motion.iter().sum::<f32>() / motion.len() as f32;
        let peak = motion.iter().copied().fold(0.0f32, f32::max);
        println!("  Motion:     mean {:.6}, max {:.6} per frame", mean, peak);
    }
    Ok(())
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let animation = load(input)?;
    let store = AnyStore::for_path(output)?;
    tracing::info!(
        "Converting {} -> {} ({} frames)",
        input.display(),
        output.display(),
        animation.frame_count()
    );
    store
        .save(output, &animation)
        .with_context(|| format!("Failed to write {} {}", store.name(), output.display()))?;
    tracing::info!("Done!");
    Ok(())
}
