//! Vertex cache binary format (.vcache)
//!
//! Animated-geometry container holding one mesh topology and an ordered run
//! of per-frame vertex snapshots.
//!
//! # Layout
//! ```text
//! Header (32 bytes, little endian):
//! 0x00: magic [u8; 4]       - "VCSH"
//! 0x04: version u16         - 1
//! 0x06: flags u16           - Reserved, must be 0
//! 0x08: vertex_count u32
//! 0x0C: frame_count u32     - At least 1
//! 0x10: first_frame u32     - 1-based number of the first frame
//! 0x14: face_count u32
//! 0x18: index_count u32
//! 0x1C: frame_rate f32
//!
//! Name:   u16 length + UTF-8 bytes
//! Faces:  face_count × u32 vertex counts, index_count × u32 indices
//! Frames: frame_count × (u32 vertex_count + vertex_count × [f32; 3])
//! ```
//!
//! Each frame block repeats its vertex count, so a frame that disagrees with
//! the topology is reported as a topology mismatch instead of a parse error.

mod codec;
mod header;

#[cfg(test)]
mod tests;

pub use codec::{decode_vertex_cache, encode_vertex_cache, write_vertex_cache};
pub use header::{POSITION_SIZE, VCACHE_MAGIC, VCACHE_VERSION, VertexCacheHeader};

/// File extension of the vertex cache container
pub const VCACHE_EXT: &str = "vcache";
