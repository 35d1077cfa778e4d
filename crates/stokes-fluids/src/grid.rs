use ndarray::{Array1, Array2};

/// Discretized field state for one simulation run.
///
/// All field arrays are shape `(ny, nx)` with row index `j` along y and
/// column index `i` along x, y increasing upwards. Exclusively owned by one
/// run and mutated in place every step.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidState {
    /// Number of grid points in the X direction.
    pub nx: usize,
    /// Number of grid points in the Y direction.
    pub ny: usize,
    /// Grid spacing in the X direction.
    pub dx: f64,
    /// Grid spacing in the Y direction.
    pub dy: f64,

    /// X velocity component.
    pub u: Array2<f64>,
    /// Y velocity component.
    pub v: Array2<f64>,
    /// Pressure.
    pub p: Array2<f64>,
    /// Divergence source term for the pressure Poisson equation.
    pub b: Array2<f64>,

    /// X coordinates, length `nx`, evenly spaced over `[0, Lx]`.
    pub x: Array1<f64>,
    /// Y coordinates, length `ny`, evenly spaced over `[0, Ly]`.
    pub y: Array1<f64>,
}

impl FluidState {
    /// Allocates a zero-filled state over the `[0, lx] × [0, ly]` domain.
    pub fn allocate(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        let dx = lx / (nx - 1) as f64;
        let dy = ly / (ny - 1) as f64;

        Self {
            nx,
            ny,
            dx,
            dy,
            u: Array2::zeros((ny, nx)),
            v: Array2::zeros((ny, nx)),
            p: Array2::zeros((ny, nx)),
            b: Array2::zeros((ny, nx)),
            x: Array1::from_iter((0..nx).map(|i| i as f64 * dx)),
            y: Array1::from_iter((0..ny).map(|j| j as f64 * dy)),
        }
    }
}
