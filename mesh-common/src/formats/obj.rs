//! Wavefront OBJ snapshots
//!
//! Only vertex positions and face connectivity are read; texture coordinates,
//! normals, groups and materials are ignored.

use std::io::{BufRead, Write};

use glam::Vec3;

use crate::error::{Result, StoreError};

/// Positions and polygon faces parsed from one OBJ file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjSnapshot {
    pub positions: Vec<Vec3>,
    pub face_counts: Vec<u32>,
    pub face_indices: Vec<u32>,
}

/// Parse an OBJ document
pub fn read_obj<R: BufRead>(reader: R) -> Result<ObjSnapshot> {
    let mut snapshot = ObjSnapshot::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| StoreError::format(format!("OBJ read failed: {}", e)))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" => {
                if parts.len() < 4 {
                    return Err(StoreError::format(format!(
                        "OBJ line {}: vertex needs 3 coordinates",
                        line_no + 1
                    )));
                }
                let coord = |s: &str| {
                    s.parse::<f32>().map_err(|_| {
                        StoreError::format(format!(
                            "OBJ line {}: invalid coordinate '{}'",
                            line_no + 1,
                            s
                        ))
                    })
                };
                snapshot
                    .positions
                    .push(Vec3::new(coord(parts[1])?, coord(parts[2])?, coord(parts[3])?));
            }
            "f" => {
                if parts.len() < 4 {
                    return Err(StoreError::format(format!(
                        "OBJ line {}: face needs at least 3 vertices",
                        line_no + 1
                    )));
                }
                for corner in &parts[1..] {
                    let index = parse_face_index(corner, snapshot.positions.len())
                        .ok_or_else(|| {
                            StoreError::format(format!(
                                "OBJ line {}: invalid face index '{}'",
                                line_no + 1,
                                corner
                            ))
                        })?;
                    snapshot.face_indices.push(index);
                }
                snapshot.face_counts.push((parts.len() - 1) as u32);
            }
            _ => {}
        }
    }

    Ok(snapshot)
}

/// Resolve `v`, `v/vt`, `v//vn` or `v/vt/vn`, including negative relative indices
fn parse_face_index(corner: &str, vertex_count: usize) -> Option<u32> {
    let raw: i64 = corner.split('/').next()?.parse().ok()?;
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        vertex_count as i64 + raw
    } else {
        return None;
    };
    if resolved < 0 || resolved as usize >= vertex_count {
        return None;
    }
    Some(resolved as u32)
}

/// Write positions and faces as an OBJ document
pub fn write_obj<W: Write>(
    w: &mut W,
    name: &str,
    positions: &[Vec3],
    face_counts: &[u32],
    face_indices: &[u32],
) -> std::io::Result<()> {
    if !name.is_empty() {
        writeln!(w, "o {}", name)?;
    }
    for p in positions {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    let mut offset = 0usize;
    for &count in face_counts {
        write!(w, "f")?;
        for index in &face_indices[offset..offset + count as usize] {
            write!(w, " {}", index + 1)?;
        }
        writeln!(w)?;
        offset += count as usize;
    }
    Ok(())
}
