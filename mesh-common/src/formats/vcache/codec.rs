//! Encoding and decoding of whole vertex caches

use std::io::Write;

use glam::Vec3;

use super::header::{POSITION_SIZE, VertexCacheHeader};
use crate::animation::{Frame, MeshAnimation, Topology};
use crate::error::{Result, StoreError};

/// Write a complete vertex cache
pub fn write_vertex_cache<W: Write>(w: &mut W, animation: &MeshAnimation) -> std::io::Result<()> {
    let topology = animation.topology();
    let header = VertexCacheHeader::new(
        topology.vertex_count as u32,
        animation.frame_count() as u32,
        animation.first_frame(),
        topology.face_count() as u32,
        topology.face_indices.len() as u32,
        animation.frame_rate(),
    );
    w.write_all(&header.to_bytes())?;

    // Longer names are cut at a char boundary rather than rejected
    let mut name_len = topology.name.len().min(u16::MAX as usize);
    while !topology.name.is_char_boundary(name_len) {
        name_len -= 1;
    }
    w.write_all(&(name_len as u16).to_le_bytes())?;
    w.write_all(&topology.name.as_bytes()[..name_len])?;

    for count in &topology.face_counts {
        w.write_all(&count.to_le_bytes())?;
    }
    for index in &topology.face_indices {
        w.write_all(&index.to_le_bytes())?;
    }

    for frame in animation.frames() {
        w.write_all(&(frame.positions.len() as u32).to_le_bytes())?;
        for p in &frame.positions {
            w.write_all(&p.x.to_le_bytes())?;
            w.write_all(&p.y.to_le_bytes())?;
            w.write_all(&p.z.to_le_bytes())?;
        }
    }

    Ok(())
}

/// Encode a vertex cache into memory
pub fn encode_vertex_cache(animation: &MeshAnimation) -> Vec<u8> {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_vertex_cache(&mut bytes, animation);
    bytes
}

/// Decode a vertex cache, validating header, topology and every frame block
pub fn decode_vertex_cache(bytes: &[u8]) -> Result<MeshAnimation> {
    let header = VertexCacheHeader::from_bytes(bytes).ok_or_else(|| {
        StoreError::format(format!(
            "file too small for header ({} bytes, need {})",
            bytes.len(),
            VertexCacheHeader::SIZE
        ))
    })?;
    header.validate().map_err(StoreError::Format)?;

    let mut reader = ByteReader::new(&bytes[VertexCacheHeader::SIZE..]);

    let name_len = reader.u16("mesh name length")? as usize;
    let name = std::str::from_utf8(reader.take(name_len, "mesh name")?)
        .map_err(|_| StoreError::format("mesh name is not valid UTF-8"))?
        .to_string();

    let face_counts = reader.u32_array(header.face_count as usize, "face counts")?;
    let face_indices = reader.u32_array(header.index_count as usize, "face indices")?;
    let topology =
        Topology::new(name, header.vertex_count as usize).with_faces(face_counts, face_indices);

    let mut frames = Vec::with_capacity((header.frame_count as usize).min(reader.remaining()));
    for i in 0..header.frame_count {
        let number = header.first_frame + i;
        let found = reader.u32("frame vertex count")? as usize;
        if found != topology.vertex_count {
            return Err(StoreError::TopologyMismatch {
                frame: number,
                expected: topology.vertex_count,
                found,
            });
        }
        let raw = reader.take(found * POSITION_SIZE, "frame positions")?;
        let positions = raw
            .chunks_exact(POSITION_SIZE)
            .map(|c| Vec3::new(f32_at(c, 0), f32_at(c, 4), f32_at(c, 8)))
            .collect();
        frames.push(Frame::new(number, positions));
    }

    if reader.remaining() != 0 {
        return Err(StoreError::format(format!(
            "{} trailing bytes after last frame",
            reader.remaining()
        )));
    }

    tracing::debug!(
        "Decoded vertex cache '{}': {} vertices, {} frames",
        topology.name,
        topology.vertex_count,
        frames.len()
    );

    MeshAnimation::new(topology, frames)?.with_frame_rate(header.frame_rate)
}

#[inline]
fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Bounds-checked little-endian reader
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(StoreError::format(format!(
                "truncated {}: need {} bytes, {} left",
                what,
                len,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u32_array(&mut self, count: usize, what: &str) -> Result<Vec<u32>> {
        let len = count
            .checked_mul(4)
            .ok_or_else(|| StoreError::format(format!("{} count overflows", what)))?;
        let raw = self.take(len, what)?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}
