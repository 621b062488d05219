//! Denoising of time-varying mesh vertex streams
//!
//! Every vertex of a fixed-topology animation is smoothed along its own
//! trajectory. Two filters share one windowed weighted-average core:
//!
//! - [`TemporalDenoiser`] - linear or Gaussian weights over frame distance
//! - [`BilateralDenoiser`] - Gaussian over frame distance times Gaussian over
//!   per-vertex displacement, optionally motion adaptive
//!
//! [`Pipeline`] applies either filter to a frame range of a
//! [`MeshAnimation`](mesh_common::MeshAnimation), in parallel with rayon.
//!
//! ```no_run
//! use mesh_denoise::{Denoiser, FrameRange, Pipeline, Preset};
//! use mesh_common::VCacheStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let denoiser = Denoiser::bilateral(Preset::Medium.params())?;
//! let pipeline = Pipeline::new(denoiser).with_range(FrameRange::new(1, 120)?);
//! pipeline.process_file(
//!     &VCacheStore,
//!     Path::new("scan.vcache"),
//!     &VCacheStore,
//!     Path::new("clean.vcache"),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod bilateral;
pub mod cancel;
pub mod denoiser;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod motion;
pub mod params;
pub mod presets;
pub mod range;
pub mod temporal;
pub mod window;

pub use bilateral::BilateralDenoiser;
pub use cancel::CancelFlag;
pub use denoiser::{Denoise, Denoiser};
pub use driver::{JobReport, Pipeline};
pub use error::{DenoiseError, Result};
pub use params::{BilateralParams, TemporalParams, WeightKernel, WindowSize};
pub use presets::Preset;
pub use range::FrameRange;
pub use temporal::TemporalDenoiser;
pub use window::{FramePlan, FrameWindow};
