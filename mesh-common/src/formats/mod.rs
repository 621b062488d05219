//! Animated-geometry containers
//!
//! - [`vcache`] - Binary vertex cache, the native container
//! - [`obj`] - Per-frame Wavefront OBJ snapshots

pub mod obj;
pub mod vcache;

pub use obj::{ObjSnapshot, read_obj, write_obj};
pub use vcache::*;
