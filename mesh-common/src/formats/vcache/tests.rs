//! Tests for the vertex cache format

use super::*;
use crate::animation::{MeshAnimation, Topology};
use crate::error::StoreError;
use glam::Vec3;

fn sample_animation() -> MeshAnimation {
    let topology = Topology::new("quad", 4).with_faces(vec![3, 3], vec![0, 1, 2, 2, 1, 3]);
    let frames = (0..3)
        .map(|f| {
            (0..4)
                .map(|v| Vec3::new(v as f32 * 0.5, f as f32 * 0.1 + 1e-7, -(v as f32) / 3.0))
                .collect()
        })
        .collect();
    MeshAnimation::from_positions(topology, 7, frames)
        .unwrap()
        .with_frame_rate(30.0)
        .unwrap()
}

// ========================================================================
// Header Tests
// ========================================================================

#[test]
fn test_header_roundtrip() {
    let header = VertexCacheHeader::new(1200, 90, 1, 400, 1200, 24.0);
    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), VertexCacheHeader::SIZE);
    assert_eq!(&bytes[0..4], b"VCSH");

    let parsed = VertexCacheHeader::from_bytes(&bytes).unwrap();
    assert_eq!(parsed, header);
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_header_from_short_bytes() {
    assert!(VertexCacheHeader::from_bytes(&[0u8; 8]).is_none());
}

#[test]
fn test_header_validation() {
    let mut header = VertexCacheHeader::new(10, 0, 1, 0, 0, 24.0);
    assert!(header.validate().unwrap_err().contains("no frames"));

    header.frame_count = 5;
    header.first_frame = 0;
    assert!(header.validate().unwrap_err().contains("1-based"));

    header.first_frame = 1;
    header.flags = 1;
    assert!(header.validate().unwrap_err().contains("flags"));

    header.flags = 0;
    header.version = 9;
    assert!(header.validate().unwrap_err().contains("version"));

    header.version = VCACHE_VERSION;
    header.first_frame = u32::MAX - 4;
    assert_eq!(header.last_frame(), Some(u32::MAX));
    assert!(header.validate().is_ok());
    header.first_frame = u32::MAX - 3;
    assert!(header.validate().unwrap_err().contains("overflow"));
}

#[test]
fn test_frame_block_size() {
    let header = VertexCacheHeader::new(100, 1, 1, 0, 0, 24.0);
    assert_eq!(header.frame_block_size(), 4 + 100 * 12);
}

// ========================================================================
// Container Tests
// ========================================================================

#[test]
fn test_roundtrip_is_bit_exact() {
    let anim = sample_animation();
    let bytes = encode_vertex_cache(&anim);
    let decoded = decode_vertex_cache(&bytes).unwrap();

    assert_eq!(decoded.topology(), anim.topology());
    assert_eq!(decoded.first_frame(), 7);
    assert_eq!(decoded.frame_rate(), 30.0);
    for (a, b) in decoded.frames().iter().zip(anim.frames()) {
        assert_eq!(a.number, b.number);
        for (pa, pb) in a.positions.iter().zip(&b.positions) {
            assert_eq!(pa.x.to_bits(), pb.x.to_bits());
            assert_eq!(pa.y.to_bits(), pb.y.to_bits());
            assert_eq!(pa.z.to_bits(), pb.z.to_bits());
        }
    }
}

#[test]
fn test_encoded_size() {
    let anim = sample_animation();
    let bytes = encode_vertex_cache(&anim);
    let expected = VertexCacheHeader::SIZE
        + 2
        + "quad".len()
        + 2 * 4
        + 6 * 4
        + 3 * (4 + 4 * POSITION_SIZE);
    assert_eq!(bytes.len(), expected);
}

#[test]
fn test_bad_magic_is_format_error() {
    let mut bytes = encode_vertex_cache(&sample_animation());
    bytes[0] = b'X';
    let err = decode_vertex_cache(&bytes).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
    assert!(err.to_string().contains("magic"));
}

#[test]
fn test_truncated_is_format_error() {
    let bytes = encode_vertex_cache(&sample_animation());
    let err = decode_vertex_cache(&bytes[..bytes.len() - 5]).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
    assert!(err.to_string().contains("truncated"));
}

#[test]
fn test_trailing_bytes_are_format_error() {
    let mut bytes = encode_vertex_cache(&sample_animation());
    bytes.extend_from_slice(&[0, 0, 0]);
    let err = decode_vertex_cache(&bytes).unwrap_err();
    assert!(err.to_string().contains("trailing"));
}

#[test]
fn test_frame_numbers_past_u32_are_format_error() {
    let mut bytes = VertexCacheHeader::new(0, 2, u32::MAX, 0, 0, 24.0)
        .to_bytes()
        .to_vec();
    // Empty name, then two empty frame blocks
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);

    let err = decode_vertex_cache(&bytes).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
    assert!(err.to_string().contains("overflow"));
}

#[test]
fn test_frame_vertex_count_disagreement_is_topology_mismatch() {
    let anim = sample_animation();
    let mut bytes = encode_vertex_cache(&anim);

    // Patch the vertex count prefix of the second frame block
    let topology_len = 2 + "quad".len() + 2 * 4 + 6 * 4;
    let block = 4 + 4 * POSITION_SIZE;
    let offset = VertexCacheHeader::SIZE + topology_len + block;
    bytes[offset..offset + 4].copy_from_slice(&5u32.to_le_bytes());

    match decode_vertex_cache(&bytes).unwrap_err() {
        StoreError::TopologyMismatch {
            frame,
            expected,
            found,
        } => {
            assert_eq!(frame, 8);
            assert_eq!(expected, 4);
            assert_eq!(found, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_face_index_out_of_range_is_format_error() {
    let topology = Topology::new("tri", 3).with_faces(vec![3], vec![0, 1, 2]);
    let anim = MeshAnimation::from_positions(topology, 1, vec![vec![Vec3::ZERO; 3]]).unwrap();
    let mut bytes = encode_vertex_cache(&anim);
    // Last face index sits right before the single frame block
    let offset = bytes.len() - (4 + 3 * POSITION_SIZE) - 4;
    bytes[offset..offset + 4].copy_from_slice(&9u32.to_le_bytes());
    let err = decode_vertex_cache(&bytes).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}
