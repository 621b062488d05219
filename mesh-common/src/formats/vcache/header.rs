//! Vertex cache header structure and operations

/// Magic bytes at the start of every vertex cache
pub const VCACHE_MAGIC: [u8; 4] = *b"VCSH";

/// Current container version
pub const VCACHE_VERSION: u16 = 1;

/// Vertex cache header (32 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct VertexCacheHeader {
    pub magic: [u8; 4],
    pub version: u16,
    /// Reserved flags (must be 0)
    pub flags: u16,
    /// Vertices per frame
    pub vertex_count: u32,
    /// Number of frame blocks that follow the topology section
    pub frame_count: u32,
    /// Number of the first stored frame (1-based)
    pub first_frame: u32,
    pub face_count: u32,
    pub index_count: u32,
    /// Sample rate in frames per second
    pub frame_rate: f32,
}

impl VertexCacheHeader {
    pub const SIZE: usize = 32;

    pub fn new(
        vertex_count: u32,
        frame_count: u32,
        first_frame: u32,
        face_count: u32,
        index_count: u32,
        frame_rate: f32,
    ) -> Self {
        Self {
            magic: VCACHE_MAGIC,
            version: VCACHE_VERSION,
            flags: 0,
            vertex_count,
            frame_count,
            first_frame,
            face_count,
            index_count,
            frame_rate,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.first_frame.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.face_count.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.frame_rate.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let u16_at = |o: usize| u16::from_le_bytes([bytes[o], bytes[o + 1]]);
        let u32_at =
            |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u16_at(4),
            flags: u16_at(6),
            vertex_count: u32_at(8),
            frame_count: u32_at(12),
            first_frame: u32_at(16),
            face_count: u32_at(20),
            index_count: u32_at(24),
            frame_rate: f32::from_bits(u32_at(28)),
        })
    }

    /// Describe the first problem with this header, if any
    pub fn validate(&self) -> Result<(), String> {
        if self.magic != VCACHE_MAGIC {
            return Err(format!("bad magic bytes {:?}", self.magic));
        }
        if self.version != VCACHE_VERSION {
            return Err(format!("unsupported version {}", self.version));
        }
        if self.flags != 0 {
            return Err(format!("reserved flags set ({:#06x})", self.flags));
        }
        if self.frame_count == 0 {
            return Err("no frames".to_string());
        }
        if self.first_frame == 0 {
            return Err("first frame must be 1-based".to_string());
        }
        if self.last_frame().is_none() {
            return Err(format!(
                "frame numbers overflow: {} frames from frame {}",
                self.frame_count, self.first_frame
            ));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(format!("invalid frame rate {}", self.frame_rate));
        }
        Ok(())
    }

    /// Number of the last stored frame, `None` when it does not fit in a u32
    pub fn last_frame(&self) -> Option<u32> {
        self.first_frame.checked_add(self.frame_count.checked_sub(1)?)
    }

    /// Size of one frame block (vertex count prefix + positions)
    pub fn frame_block_size(&self) -> usize {
        4 + self.vertex_count as usize * POSITION_SIZE
    }
}

/// Size of one stored position (3 × f32)
pub const POSITION_SIZE: usize = 12;
