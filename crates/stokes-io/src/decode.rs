use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use ndarray::{Array1, Array2};
use smallvec::SmallVec;
use thiserror::Error;

use stokes_fluids::Snapshot;

use crate::{META_NAME, RECORD_EXT, RECORD_PREFIX};

/// Reads snapshot records back from a run directory.
pub struct SnapshotDecoder {
    /// The directory in which the records reside.
    path: PathBuf,
}

/// Upper bound on values per decoded section. Record headers are untrusted
/// input; a corrupted grid size must surface as an error, not as a
/// multi-gigabyte allocation.
const MAX_SECTION_LEN: usize = 1 << 24;

/// Run-level metadata from the `_meta` record.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub grid: [usize; 2],
    pub time_steps: usize,
    pub snapshot_interval: usize,
    pub domain: SmallVec<[f64; 2]>,
}

impl SnapshotDecoder {
    pub fn new(path: impl Into<PathBuf>) -> SnapshotDecoder {
        Self { path: path.into() }
    }

    pub fn decode_metadata(&self) -> Result<RunMetadata, DecodingError> {
        let mut reader = BufReader::new(File::open(self.path.join(META_NAME))?);

        let nx = read_u64(&mut reader)? as usize;
        let ny = read_u64(&mut reader)? as usize;
        let time_steps = read_u64(&mut reader)? as usize;
        let snapshot_interval = read_u64(&mut reader)? as usize;

        let mut domain = SmallVec::new();
        for _ in 0..2 {
            domain.push(read_f64(&mut reader)?);
        }

        Ok(RunMetadata {
            grid: [nx, ny],
            time_steps,
            snapshot_interval,
            domain,
        })
    }

    /// All record paths of the run, sorted ascending by name. The zero-padded
    /// step index makes that step order.
    pub fn record_paths(&self) -> Result<Vec<PathBuf>, DecodingError> {
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(&self.path)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };

            if name.starts_with(RECORD_PREFIX) && name.ends_with(&format!(".{RECORD_EXT}")) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Rebuilds one snapshot from its record. Records are self-contained, so
    /// any record can be decoded without the others.
    pub fn decode_snapshot(&self, path: &Path) -> Result<Snapshot, DecodingError> {
        let mut reader = BufReader::new(File::open(path)?);

        let step = read_u64(&mut reader)? as usize;
        let ny = read_u64(&mut reader)? as usize;
        let nx = read_u64(&mut reader)? as usize;

        ny.checked_mul(nx)
            .filter(|&cells| cells <= MAX_SECTION_LEN)
            .ok_or(DecodingError::OversizedRecord { ny, nx })?;

        let u = read_field(&mut reader, ny, nx)?;
        let v = read_field(&mut reader, ny, nx)?;
        let p = read_field(&mut reader, ny, nx)?;

        let x = Array1::from_vec(read_section(&mut reader, nx)?);
        let y = Array1::from_vec(read_section(&mut reader, ny)?);

        Ok(Snapshot { step, u, v, p, x, y })
    }

    /// Decodes every record of the run in step order.
    pub fn decode_all(&self) -> Result<Vec<Snapshot>, DecodingError> {
        self.record_paths()?
            .iter()
            .map(|path| self.decode_snapshot(path))
            .collect()
    }
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, DecodingError> {
    let mut bytes = [0; 8];
    reader.read_exact(&mut bytes)?;
    Ok(u64::from_ne_bytes(bytes))
}

fn read_f64<R: Read>(reader: &mut R) -> Result<f64, DecodingError> {
    let mut bytes = [0; 8];
    reader.read_exact(&mut bytes)?;
    Ok(f64::from_ne_bytes(bytes))
}

// Sections are only read where the caller already knows how many values
// belong there, so the length header is cross-checked before any allocation
// sized from it.
fn read_section<R: Read>(reader: &mut R, expected: usize) -> Result<Vec<f64>, DecodingError> {
    let len = read_u64(reader)? as usize;
    if len != expected {
        return Err(DecodingError::ShapeMismatch { expected, found: len });
    }

    let mut bytes = vec![0; len * 8];
    reader.read_exact(&mut bytes)?;

    Ok(bytes
        .chunks_exact(8)
        .map(|b| f64::from_ne_bytes(b.try_into().expect("chunk of 8 bytes")))
        .collect())
}

fn read_field<R: Read>(reader: &mut R, ny: usize, nx: usize) -> Result<Array2<f64>, DecodingError> {
    let values = read_section(reader, ny * nx)?;
    let found = values.len();

    Array2::from_shape_vec((ny, nx), values).map_err(|_| DecodingError::ShapeMismatch {
        expected: ny * nx,
        found,
    })
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("section holds {found} values, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("record claims a {ny}x{nx} grid, larger than the decoder allows")]
    OversizedRecord { ny: usize, nx: usize },
}
