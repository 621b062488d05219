//! Frame stores: load and save whole frame sequences
//!
//! A store is the only place that touches the file system. Denoising code
//! receives a validated [`MeshAnimation`] and hands a new one back for writing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::animation::{Frame, MeshAnimation, Topology};
use crate::error::{Result, StoreError};
use crate::formats::{VCACHE_EXT, decode_vertex_cache, read_obj, write_obj, write_vertex_cache};

/// Load/save contract shared by every container
pub trait FrameStore {
    /// Read topology and all frames
    fn load(&self, path: &Path) -> Result<MeshAnimation>;

    /// Write topology and all frames, replacing any previous content
    fn save(&self, path: &Path, animation: &MeshAnimation) -> Result<()>;
}

/// Binary `.vcache` container
#[derive(Debug, Clone, Copy, Default)]
pub struct VCacheStore;

impl FrameStore for VCacheStore {
    fn load(&self, path: &Path) -> Result<MeshAnimation> {
        let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        decode_vertex_cache(&bytes)
    }

    fn save(&self, path: &Path, animation: &MeshAnimation) -> Result<()> {
        let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        write_vertex_cache(&mut writer, animation).map_err(|e| StoreError::io(path, e))?;
        writer.flush().map_err(|e| StoreError::io(path, e))
    }
}

/// Directory of OBJ files, one per frame.
///
/// Connectivity comes from the first file. When every file name ends in a
/// frame number (`frame_12.obj`, `frame_0013.obj`) those numbers order and
/// number the frames, and a gap or duplicate is a format error. Otherwise
/// files are ordered by name and numbered from 1.
///
/// Saving replaces every `.obj` file already in the directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjSequenceStore;

impl ObjSequenceStore {
    fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(dir, e))?.path();
            let is_obj = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
            if is_obj && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| (trailing_number(a), a).cmp(&(trailing_number(b), b)));
        Ok(files)
    }

    /// Frame number of every file, in load order
    fn frame_numbers(files: &[PathBuf]) -> Result<Vec<u32>> {
        let parsed: Option<Vec<u32>> = files
            .iter()
            .map(|f| trailing_number(f).filter(|&n| n > 0))
            .collect();
        match parsed {
            Some(numbers) => Ok(numbers),
            None => (1..=files.len())
                .map(|n| {
                    u32::try_from(n).map_err(|_| StoreError::format("too many frame files"))
                })
                .collect(),
        }
    }
}

impl FrameStore for ObjSequenceStore {
    fn load(&self, path: &Path) -> Result<MeshAnimation> {
        let files = Self::frame_files(path)?;
        if files.is_empty() {
            return Err(StoreError::format(format!(
                "no .obj files in {}",
                path.display()
            )));
        }
        let numbers = Self::frame_numbers(&files)?;

        let mut topology: Option<Topology> = None;
        let mut frames = Vec::with_capacity(files.len());
        for (file, &number) in files.iter().zip(&numbers) {
            let reader = File::open(file).map_err(|e| StoreError::io(file, e))?;
            let snapshot = read_obj(BufReader::new(reader))?;

            let topology = topology.get_or_insert_with(|| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Topology::new(name, snapshot.positions.len())
                    .with_faces(snapshot.face_counts.clone(), snapshot.face_indices.clone())
            });
            if snapshot.positions.len() != topology.vertex_count {
                return Err(StoreError::TopologyMismatch {
                    frame: number,
                    expected: topology.vertex_count,
                    found: snapshot.positions.len(),
                });
            }
            frames.push(Frame::new(number, snapshot.positions));
        }

        tracing::debug!("Loaded {} OBJ frames from {}", frames.len(), path.display());
        MeshAnimation::new(topology.unwrap_or_default(), frames)
    }

    fn save(&self, path: &Path, animation: &MeshAnimation) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))?;
        let stale = Self::frame_files(path)?;
        if !stale.is_empty() {
            tracing::debug!("Removing {} old OBJ frames from {}", stale.len(), path.display());
        }
        for file in stale {
            fs::remove_file(&file).map_err(|e| StoreError::io(&file, e))?;
        }

        let topology = animation.topology();
        for frame in animation.frames() {
            let file_path = path.join(format!("frame_{:04}.obj", frame.number));
            let file = File::create(&file_path).map_err(|e| StoreError::io(&file_path, e))?;
            let mut writer = BufWriter::new(file);
            write_obj(
                &mut writer,
                &topology.name,
                &frame.positions,
                &topology.face_counts,
                &topology.face_indices,
            )
            .and_then(|_| writer.flush())
            .map_err(|e| StoreError::io(&file_path, e))?;
        }
        Ok(())
    }
}

fn trailing_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().ok()
}

/// Store chosen from the shape of a path
#[derive(Debug, Clone, Copy)]
pub enum AnyStore {
    VCache(VCacheStore),
    ObjSequence(ObjSequenceStore),
}

impl AnyStore {
    /// `.vcache` files use the binary container; directories and
    /// extension-less paths are OBJ sequences.
    pub fn for_path(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::ObjSequence(ObjSequenceStore));
        }
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Self::ObjSequence(ObjSequenceStore)),
            Some(ext) if ext.eq_ignore_ascii_case(VCACHE_EXT) => Ok(Self::VCache(VCacheStore)),
            Some(ext) => Err(StoreError::format(format!(
                "unsupported container extension '.{}' for {} (use .{} or an OBJ directory)",
                ext,
                path.display(),
                VCACHE_EXT
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VCache(_) => "vertex cache",
            Self::ObjSequence(_) => "OBJ sequence",
        }
    }
}

impl FrameStore for AnyStore {
    fn load(&self, path: &Path) -> Result<MeshAnimation> {
        match self {
            Self::VCache(store) => store.load(path),
            Self::ObjSequence(store) => store.load(path),
        }
    }

    fn save(&self, path: &Path, animation: &MeshAnimation) -> Result<()> {
        match self {
            Self::VCache(store) => store.save(path, animation),
            Self::ObjSequence(store) => store.save(path, animation),
        }
    }
}
