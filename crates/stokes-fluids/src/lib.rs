use thiserror::Error;

pub mod grid;
pub mod pressure;
pub mod seed;
pub mod stepper;

pub use grid::FluidState;
pub use stepper::{Simulation, Snapshot, Snapshots};

/// Unrecoverable runtime failure. The run aborts on the first occurrence;
/// anything written before it stays valid.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("non-finite value in {field} at step {step}")]
    NonFinite { field: &'static str, step: usize },
}
