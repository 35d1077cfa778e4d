use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use stokes_fluids::Snapshot;

use crate::{pad_width, META_NAME, RECORD_EXT, RECORD_PREFIX};

/// Writes snapshot records into a run directory.
pub struct SnapshotEncoder {
    /// The directory into which the records are placed.
    path: PathBuf,
    /// Pad width for the zero-padded step index in record names.
    digits: usize,
}

impl SnapshotEncoder {
    /// Creates the run directory (if needed) and an encoder over it.
    ///
    /// `time_steps` fixes the zero-pad width so every record of the run
    /// sorts lexicographically by step.
    pub fn create(path: impl Into<PathBuf>, time_steps: usize) -> Result<Self, EncodingError> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            digits: pad_width(time_steps.saturating_sub(1)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record_path(&self, step: usize) -> PathBuf {
        self.path.join(format!(
            "{RECORD_PREFIX}{step:0width$}.{RECORD_EXT}",
            width = self.digits
        ))
    }

    /// Writes the run-level `_meta` record.
    pub fn encode_metadata(
        &self,
        grid: [usize; 2],
        time_steps: usize,
        snapshot_interval: usize,
        domain: [f64; 2],
    ) -> Result<(), EncodingError> {
        let mut writer = File::create(self.path.join(META_NAME))?;

        writer.write_all(&(grid[0] as u64).to_ne_bytes())?;
        writer.write_all(&(grid[1] as u64).to_ne_bytes())?;
        writer.write_all(&(time_steps as u64).to_ne_bytes())?;
        writer.write_all(&(snapshot_interval as u64).to_ne_bytes())?;
        for extent in domain {
            writer.write_all(&extent.to_ne_bytes())?;
        }

        Ok(())
    }

    /// Writes one self-contained snapshot record, silently replacing any
    /// existing record for the same step index.
    pub fn encode_snapshot(&self, snapshot: &Snapshot) -> Result<PathBuf, EncodingError> {
        let path = self.record_path(snapshot.step);
        let mut writer = BufWriter::new(File::create(&path)?);

        let (ny, nx) = snapshot.u.dim();
        writer.write_all(&(snapshot.step as u64).to_ne_bytes())?;
        writer.write_all(&(ny as u64).to_ne_bytes())?;
        writer.write_all(&(nx as u64).to_ne_bytes())?;

        for values in [&snapshot.u, &snapshot.v, &snapshot.p] {
            encode_section(&mut writer, values.iter().copied())?;
        }
        encode_section(&mut writer, snapshot.x.iter().copied())?;
        encode_section(&mut writer, snapshot.y.iter().copied())?;

        writer.flush()?;
        Ok(path)
    }
}

fn encode_section<W: Write>(
    writer: &mut W,
    values: impl ExactSizeIterator<Item = f64>,
) -> Result<(), EncodingError> {
    writer.write_all(&(values.len() as u64).to_ne_bytes())?;

    let bytes: Vec<u8> = values.flat_map(|v| v.to_ne_bytes()).collect();
    writer.write_all(&bytes)?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
