//! Shared types for the dynamic mesh denoiser
//!
//! This crate holds everything the denoising core and the command-line tools
//! agree on:
//!
//! # Modules
//!
//! - [`animation`] - Topology, frames and validated frame sequences
//! - [`formats`] - Vertex cache and OBJ containers
//! - [`store`] - Load/save contract over those containers
//! - [`error`] - Store errors

pub mod animation;
pub mod error;
pub mod formats;
pub mod store;

pub use animation::{DEFAULT_FRAME_RATE, Frame, MeshAnimation, Topology};
pub use error::StoreError;
pub use formats::{VCACHE_EXT, decode_vertex_cache, encode_vertex_cache};
pub use store::{AnyStore, FrameStore, ObjSequenceStore, VCacheStore};

// Positions are plain glam vectors
pub use glam::Vec3;
