//! Per-frame vertex snapshots over a fixed mesh topology

use glam::Vec3;

use crate::error::{Result, StoreError};

/// Sample rate written when the source container carries none (frames per second)
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Mesh connectivity shared by every frame of a sequence.
///
/// Faces are stored polygon-soup style: `face_counts[i]` vertices per face,
/// indices laid out back to back in `face_indices`. Face data is optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Topology {
    pub name: String,
    pub vertex_count: usize,
    pub face_counts: Vec<u32>,
    pub face_indices: Vec<u32>,
}

impl Topology {
    pub fn new(name: impl Into<String>, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            face_counts: Vec::new(),
            face_indices: Vec::new(),
        }
    }

    pub fn with_faces(mut self, face_counts: Vec<u32>, face_indices: Vec<u32>) -> Self {
        self.face_counts = face_counts;
        self.face_indices = face_indices;
        self
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    pub fn has_faces(&self) -> bool {
        !self.face_counts.is_empty()
    }

    /// Iterate faces as index slices
    pub fn faces(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let mut offset = 0usize;
        self.face_counts.iter().map(move |&count| {
            let face = &self.face_indices[offset..offset + count as usize];
            offset += count as usize;
            face
        })
    }

    /// Check that face counts cover the index list and every index names a vertex
    pub fn validate(&self) -> Result<()> {
        let total: u64 = self.face_counts.iter().map(|&c| c as u64).sum();
        if total != self.face_indices.len() as u64 {
            return Err(StoreError::format(format!(
                "face counts sum to {} but {} face indices are present",
                total,
                self.face_indices.len()
            )));
        }
        if let Some(&bad) = self
            .face_indices
            .iter()
            .find(|&&i| i as usize >= self.vertex_count)
        {
            return Err(StoreError::format(format!(
                "face index {} out of range for {} vertices",
                bad, self.vertex_count
            )));
        }
        Ok(())
    }
}

/// One snapshot of every vertex position
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 1-based frame number
    pub number: u32,
    pub positions: Vec<Vec3>,
}

impl Frame {
    pub fn new(number: u32, positions: Vec<Vec3>) -> Self {
        Self { number, positions }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Ordered, consecutively numbered frames sharing one topology.
///
/// Construction validates the whole sequence, so holders of a `MeshAnimation`
/// can index any frame by vertex without further checks.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAnimation {
    topology: Topology,
    frames: Vec<Frame>,
    frame_rate: f32,
}

impl MeshAnimation {
    pub fn new(topology: Topology, frames: Vec<Frame>) -> Result<Self> {
        topology.validate()?;
        validate_frames(&topology, &frames)?;
        Ok(Self {
            topology,
            frames,
            frame_rate: DEFAULT_FRAME_RATE,
        })
    }

    /// Build a sequence from raw position arrays numbered from `first_frame`
    pub fn from_positions(
        topology: Topology,
        first_frame: u32,
        positions: Vec<Vec<Vec3>>,
    ) -> Result<Self> {
        let frames = positions
            .into_iter()
            .enumerate()
            .map(|(i, p)| Frame::new(first_frame + i as u32, p))
            .collect();
        Self::new(topology, frames)
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Result<Self> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(StoreError::format(format!(
                "invalid frame rate {}",
                frame_rate
            )));
        }
        self.frame_rate = frame_rate;
        Ok(self)
    }

    /// Same topology and frame rate, new frames
    pub fn with_frames(&self, frames: Vec<Frame>) -> Result<Self> {
        validate_frames(&self.topology, &frames)?;
        Ok(Self {
            topology: self.topology.clone(),
            frames,
            frame_rate: self.frame_rate,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn vertex_count(&self) -> usize {
        self.topology.vertex_count
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn first_frame(&self) -> u32 {
        self.frames[0].number
    }

    pub fn last_frame(&self) -> u32 {
        self.frames[self.frames.len() - 1].number
    }

    pub fn frame(&self, number: u32) -> Option<&Frame> {
        let index = number.checked_sub(self.first_frame())? as usize;
        self.frames.get(index)
    }

    /// Positions of one vertex across all frames
    pub fn trajectory(&self, vertex: usize) -> impl Iterator<Item = Vec3> + '_ {
        self.frames.iter().map(move |f| f.positions[vertex])
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

fn validate_frames(topology: &Topology, frames: &[Frame]) -> Result<()> {
    let Some(first) = frames.first() else {
        return Err(StoreError::format("sequence contains no frames"));
    };
    if first.number == 0 {
        return Err(StoreError::format("frame numbers are 1-based"));
    }

    for (i, frame) in frames.iter().enumerate() {
        let expected_number = first.number as u64 + i as u64;
        if frame.number as u64 != expected_number {
            return Err(StoreError::format(format!(
                "frame numbers are not consecutive: expected {}, found {}",
                expected_number, frame.number
            )));
        }
        if frame.vertex_count() != topology.vertex_count {
            return Err(StoreError::TopologyMismatch {
                frame: frame.number,
                expected: topology.vertex_count,
                found: frame.vertex_count(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, x: f32) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(x, i as f32, 0.0)).collect()
    }

    #[test]
    fn test_sequence_numbering() {
        let anim =
            MeshAnimation::from_positions(Topology::new("m", 2), 5, vec![line(2, 0.0), line(2, 1.0)])
                .unwrap();
        assert_eq!(anim.first_frame(), 5);
        assert_eq!(anim.last_frame(), 6);
        assert_eq!(anim.frame(6).unwrap().positions[0].x, 1.0);
        assert!(anim.frame(4).is_none());
        assert!(anim.frame(7).is_none());
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let err =
            MeshAnimation::from_positions(Topology::new("m", 2), 1, vec![line(2, 0.0), line(3, 1.0)])
                .unwrap_err();
        match err {
            StoreError::TopologyMismatch {
                frame,
                expected,
                found,
            } => {
                assert_eq!(frame, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_and_zero_based_rejected() {
        assert!(MeshAnimation::new(Topology::new("m", 1), vec![]).is_err());
        assert!(MeshAnimation::from_positions(Topology::new("m", 1), 0, vec![line(1, 0.0)]).is_err());
    }

    #[test]
    fn test_gap_in_numbering_rejected() {
        let frames = vec![Frame::new(1, line(1, 0.0)), Frame::new(3, line(1, 0.0))];
        let err = MeshAnimation::new(Topology::new("m", 1), frames).unwrap_err();
        assert!(err.to_string().contains("not consecutive"));
    }

    #[test]
    fn test_face_validation() {
        let ok = Topology::new("tri", 3).with_faces(vec![3], vec![0, 1, 2]);
        assert!(ok.validate().is_ok());
        assert_eq!(ok.faces().collect::<Vec<_>>(), vec![&[0u32, 1, 2][..]]);

        let short = Topology::new("tri", 3).with_faces(vec![4], vec![0, 1, 2]);
        assert!(short.validate().is_err());

        let out_of_range = Topology::new("tri", 3).with_faces(vec![3], vec![0, 1, 3]);
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_trajectory() {
        let anim = MeshAnimation::from_positions(
            Topology::new("m", 2),
            1,
            vec![line(2, 0.0), line(2, 1.0), line(2, 2.0)],
        )
        .unwrap();
        let xs: Vec<f32> = anim.trajectory(1).map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_frame_rate_validation() {
        let anim = MeshAnimation::from_positions(Topology::new("m", 1), 1, vec![line(1, 0.0)]).unwrap();
        assert_eq!(anim.frame_rate(), DEFAULT_FRAME_RATE);
        assert!(anim.clone().with_frame_rate(0.0).is_err());
        assert_eq!(anim.with_frame_rate(30.0).unwrap().frame_rate(), 30.0);
    }
}
