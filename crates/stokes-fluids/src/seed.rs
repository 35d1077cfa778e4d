//! Initial-condition generators.
//!
//! These are stylization profiles, not physically derived fields: each writes
//! a bounded velocity pattern into the region around the configured center
//! and leaves everything outside untouched.

use glam::DVec2;

use stokes_params::{ShapeType, SimulationConfig};

use crate::grid::FluidState;

/// Writes the configured initial condition into `state`.
///
/// Also used every step in the continuous-source regime, where the region is
/// re-seeded instead of seeded once at t = 0.
pub fn seed_initial_condition(state: &mut FluidState, config: &SimulationConfig) {
    let center = DVec2::from(config.initial_shape_position);
    let size = config.initial_shape_size;

    match config.initial_shape_type {
        ShapeType::Vortex => {
            stamp(state, |pos, u, v| {
                let d = pos - center;
                let r = d.length();
                if r <= 0.0 || r >= size {
                    return;
                }

                // Tangential swirl, linear falloff towards the rim.
                let tangent = DVec2::new(-d.y, d.x) / r;
                let mag = config.vortex_strength * (1.0 - r / size);
                *u = tangent.x * mag;
                *v = tangent.y * mag;
            });
        }
        ShapeType::CircleBurst => {
            stamp(state, |pos, u, v| {
                let d = pos - center;
                let r = d.length();
                if r <= 0.0 || r >= size {
                    return;
                }

                // Radial outflow, strongest at the center.
                let dir = d / r;
                let mag = config.source_strength * (1.0 - r / size);
                *u = dir.x * mag;
                *v = dir.y * mag;
            });
        }
        ShapeType::Crescent => {
            let vel = DVec2::from(config.initial_velocity);
            let speed = vel.length();
            if speed == 0.0 {
                return;
            }
            let dir = vel / speed;
            let half_width = 0.5 * size;

            stamp(state, |pos, u, v| {
                let d = pos - center;
                let along = d.dot(dir);
                let across = d.perp_dot(dir);
                if along.abs() > size || across.abs() > half_width {
                    return;
                }

                // Directional band along the configured velocity, fading
                // towards the band edges.
                let falloff = 1.0 - across.abs() / half_width;
                *u = vel.x * falloff;
                *v = vel.y * falloff;
            });
        }
    }
}

fn stamp<F>(state: &mut FluidState, mut f: F)
where
    F: FnMut(DVec2, &mut f64, &mut f64),
{
    for j in 0..state.ny {
        for i in 0..state.nx {
            let pos = DVec2::new(state.x[i], state.y[j]);
            let mut u = state.u[[j, i]];
            let mut v = state.v[[j, i]];
            f(pos, &mut u, &mut v);
            state.u[[j, i]] = u;
            state.v[[j, i]] = v;
        }
    }
}
