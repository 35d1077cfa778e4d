//! Pressure Poisson solve.

use crate::grid::FluidState;

/// Relaxes the pressure field against the current divergence source.
///
/// Jacobi sweeps over the interior, repeated exactly `iterations` times with
/// no residual check; the fixed cost is the point. After every sweep the
/// boundary policy is re-applied: zero-gradient on the right, top and left
/// edges, and the bottom row pinned to zero as the pressure reference.
pub fn solve(state: &mut FluidState, iterations: usize) {
    let (ny, nx) = state.p.dim();
    let dx2 = state.dx * state.dx;
    let dy2 = state.dy * state.dy;
    let denom = 2.0 * (dx2 + dy2);

    for _iter in 0..iterations {
        let pn = state.p.clone();

        for j in 1..ny - 1 {
            for i in 1..nx - 1 {
                state.p[[j, i]] = ((pn[[j, i + 1]] + pn[[j, i - 1]]) * dy2
                    + (pn[[j + 1, i]] + pn[[j - 1, i]]) * dx2)
                    / denom
                    - dx2 * dy2 / denom * state.b[[j, i]];
            }
        }

        apply_boundary(state);
    }
}

// Open on three sides, pinned on the fourth. The order matters at the
// corners and is fixed: right, top, left, bottom.
fn apply_boundary(state: &mut FluidState) {
    let (ny, nx) = state.p.dim();

    for j in 0..ny {
        state.p[[j, nx - 1]] = state.p[[j, nx - 2]];
    }
    for i in 0..nx {
        state.p[[ny - 1, i]] = state.p[[ny - 2, i]];
    }
    for j in 0..ny {
        state.p[[j, 0]] = state.p[[j, 1]];
    }
    for i in 0..nx {
        state.p[[0, i]] = 0.0;
    }
}
