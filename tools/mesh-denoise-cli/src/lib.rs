//! mesh-denoise-cli - command-line front end for mesh-denoise
//!
//! Three executables share this library:
//!
//! - `temporal-mesh-denoiser` and `bilateral-mesh-denoiser` run one filter
//!   over one input
//! - `mesh-denoise` runs manifest jobs through those executables and
//!   inspects or converts frame stores

pub mod args;
pub mod job;
pub mod logging;
pub mod manifest;
pub mod runner;
