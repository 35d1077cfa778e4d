//! Snapshot serialization.
//!
//! One record per retained step, each self-contained and independently
//! loadable: the five named f64 arrays (u, v, p, x, y) plus the step index,
//! written under a zero-padded file name so a directory listing sorts in
//! step order.

pub mod decode;
pub mod encode;

pub use decode::{DecodingError, RunMetadata, SnapshotDecoder};
pub use encode::{EncodingError, SnapshotEncoder};

/// Record file prefix, shared by encoder and decoder.
pub(crate) const RECORD_PREFIX: &str = "fluid_data_";
/// Record file extension.
pub(crate) const RECORD_EXT: &str = "dat";
/// Metadata file name.
pub(crate) const META_NAME: &str = "_meta";

/// Digits needed to zero-pad every step index of a run.
pub(crate) fn pad_width(last_step: usize) -> usize {
    (last_step.checked_ilog10().unwrap_or(0) + 1) as usize
}
